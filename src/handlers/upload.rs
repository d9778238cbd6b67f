use crate::models::upload::{IncomingFile, UploadResult};
use crate::AppState;
use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::StatusCode,
    response::Json,
};
use futures_util::TryStreamExt;
use multer::Multipart;
use serde::Deserialize;

/// Handle a multipart image upload: the `file` field is extracted here and
/// everything else (validation, naming, the move) happens in the service.
pub async fn upload_image(
    State(app_state): State<AppState>,
    request: Request<Body>,
) -> (StatusCode, Json<UploadResult>) {
    let boundary = match request
        .headers()
        .get("content-type")
        .and_then(|ct| ct.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
    {
        Some(boundary) => boundary,
        None => {
            return respond(UploadResult::failure(
                400,
                "Missing or invalid multipart boundary",
            ))
        }
    };

    // Convert the request body to a stream
    let stream = request
        .into_body()
        .into_data_stream()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err));

    let mut multipart = Multipart::new(stream, boundary);
    let mut file: Option<IncomingFile> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read multipart field: {}", e);
                return respond(UploadResult::failure(400, "Invalid multipart data"));
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let original_name = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let content_type = field.content_type().cloned();

        tracing::debug!(
            "Processing upload field (filename: {}, content_type: {:?})",
            original_name,
            content_type
        );

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("Failed to read file data: {}", e);
                return respond(UploadResult::failure(400, "Failed to read file data"));
            }
        };

        if data.len() > app_state.config.max_file_size {
            return respond(UploadResult::failure(
                400,
                format!(
                    "File size {} bytes exceeds maximum of {} bytes",
                    data.len(),
                    app_state.config.max_file_size
                ),
            ));
        }

        file = Some(IncomingFile {
            original_name,
            content_type,
            data: data.to_vec(),
        });
    }

    respond(app_state.uploader.upload(file).await)
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    /// Relative URL as returned in a prior upload result.
    pub url: String,
}

/// Delete a previously uploaded image by its relative URL.
pub async fn delete_image(
    State(app_state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> (StatusCode, Json<UploadResult>) {
    respond(app_state.uploader.delete(&query.url).await)
}

fn respond(result: UploadResult) -> (StatusCode, Json<UploadResult>) {
    let status =
        StatusCode::from_u16(result.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(result))
}
