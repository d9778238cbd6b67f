use axum::{
    body::Body,
    http::{header, Request},
    routing::{get, post},
    Router,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use dropzoner::services::uploader::UploadService;
use dropzoner::utils::config::AppConfig;
use dropzoner::{handlers, AppState};

pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// A test application backed by a temporary public root.
///
/// Holds the `TempDir` so the upload directory outlives the requests.
pub struct TestApp {
    pub app: Router,
    pub uploader: Arc<UploadService>,
    pub root: PathBuf,
    _temp: TempDir,
}

pub async fn setup_test_app() -> TestApp {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("public");

    let config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        public_root: root.to_str().unwrap().to_string(),
        ..AppConfig::default()
    };

    let uploader = Arc::new(UploadService::new(&config).expect("Failed to create upload service"));

    let app_state = AppState {
        config: Arc::new(config),
        uploader: uploader.clone(),
    };

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/health", get(handlers::health::health_check))
        .route(
            "/api/upload",
            post(handlers::upload::upload_image).delete(handlers::upload::delete_image),
        )
        .with_state(app_state);

    TestApp {
        app,
        uploader,
        root,
        _temp: temp,
    }
}

/// Build a multipart upload request with a single `file` field.
pub fn multipart_upload_request(filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .uri("/api/upload")
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Minimal valid PNG header bytes, enough to stand in for image data.
pub fn png_bytes() -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&[0u8; 64]);
    data
}

/// Count regular files under a directory, recursively.
pub fn count_files(dir: &Path) -> usize {
    let mut count = 0;
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                count += count_files(&path);
            } else {
                count += 1;
            }
        }
    }
    count
}
