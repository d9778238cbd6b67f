use anyhow::Context;
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dropzoner::handlers::{health, upload};
use dropzoner::models::upload::UploadEvent;
use dropzoner::services::uploader::UploadService;
use dropzoner::utils::config::AppConfig;
use dropzoner::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dropzoner=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting dropzoner upload server");

    // Load configuration
    let config = AppConfig::from_env();
    tracing::info!("Configuration loaded: {:?}", config);

    // Initialize the upload service (creates the public root if absent)
    let uploader = UploadService::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize upload service: {}", e))?;

    // Log lifecycle notifications; other subscribers can attach the same way
    let mut events = uploader.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(UploadEvent::ImageUploaded { original, file_type }) => {
                    tracing::info!("Image uploaded: {} ({})", original, file_type);
                }
                Ok(UploadEvent::ImageDeleted { path }) => {
                    tracing::info!("Image deleted: {}", path);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event logger lagged, skipped {} notifications", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Create shared state
    let public_root = config.public_root.clone();
    let app_state = AppState {
        config: Arc::new(config.clone()),
        uploader: Arc::new(uploader),
    };

    // Create CORS layer
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);

    // Build the application router
    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))
        .route("/api/health", get(health::health_check))
        // Upload and delete endpoints
        .route(
            "/api/upload",
            post(upload::upload_image).delete(upload::delete_image),
        )
        // Serve uploaded files from the public root
        .nest_service("/files", ServeDir::new(public_root))
        // Add shared state
        .with_state(app_state)
        // Add middleware layers
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.request_timeout_seconds,
                )))
                .layer(cors),
        );

    // Parse the bind address
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .context("Invalid bind address")?;
    tracing::info!("Server listening on {}", addr);

    // Create the server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind listener")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
