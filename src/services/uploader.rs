use std::{
    fs,
    path::{Component, Path, PathBuf},
};
use tokio::fs as async_fs;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::errors::AppError;
use crate::models::upload::{IncomingFile, UploadEvent, UploadResult};
use crate::services::templater::{PathTemplate, TemplateContext};
use crate::services::validator::UploadRules;
use crate::utils::config::AppConfig;

const SERVER_ERROR_MESSAGE: &str = "Server error, please try again";

/// Orchestrates one upload or delete at a time: validate, name, move,
/// respond. Each request is independent; the only shared resource is the
/// public root directory.
#[derive(Debug)]
pub struct UploadService {
    public_root: PathBuf,
    template: PathTemplate,
    rules: UploadRules,
    events: broadcast::Sender<UploadEvent>,
}

impl UploadService {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let public_root = PathBuf::from(&config.public_root);

        if !public_root.exists() {
            fs::create_dir_all(&public_root).map_err(|e| {
                AppError::storage_failed(format!("Failed to create public root: {}", e))
            })?;
        }

        let (events, _) = broadcast::channel(32);

        Ok(Self {
            public_root,
            template: PathTemplate::new(&config.upload_template),
            rules: config.upload_rules(),
            events,
        })
    }

    /// Subscribe to uploaded/deleted notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.events.subscribe()
    }

    pub fn public_root(&self) -> &Path {
        &self.public_root
    }

    /// Handle a single upload. Failures are reported in the result record;
    /// no file is written unless validation passed.
    pub async fn upload(&self, file: Option<IncomingFile>) -> UploadResult {
        let file = match self.rules.validate(file.as_ref()) {
            Ok(file) => file,
            Err(e) => return UploadResult::failure(e.status(), e.message()),
        };

        let ctx = TemplateContext::capture(&file.original_name);
        let relative = match self.template.render(&ctx) {
            Ok(rendered) => rendered.trim_start_matches('/').to_string(),
            Err(e) => return UploadResult::failure(e.status(), e.message()),
        };

        if let Err(e) = self.move_into_place(&relative, &file.data).await {
            tracing::error!("Failed to store upload as {}: {}", relative, e);
            return UploadResult::failure(500, SERVER_ERROR_MESSAGE);
        }

        let file_type = format!(
            ".{}",
            file.extension().unwrap_or_default().to_ascii_lowercase()
        );
        let filename = basename(&relative);

        tracing::info!(
            "Uploaded {} as {} ({} bytes)",
            file.original_name,
            relative,
            file.size()
        );

        self.notify(UploadEvent::ImageUploaded {
            original: file.original_name.clone(),
            file_type: file_type.clone(),
        });

        UploadResult {
            state: true,
            url: relative.clone(),
            filename,
            original: file.original_name.clone(),
            file_type,
            size: format_file_size(file.size()),
            code: 200,
            message: "Upload complete".to_string(),
        }
    }

    /// Delete a previously uploaded file by its relative URL.
    ///
    /// Paths escaping the public root are rejected; a missing file is 404
    /// while a failed removal is a server error, so the two cases stay
    /// distinguishable.
    pub async fn delete(&self, url: &str) -> UploadResult {
        let relative = match contained_path(url) {
            Ok(relative) => relative,
            Err(e) => return UploadResult::failure(e.status(), e.message()),
        };
        let target = self.public_root.join(&relative);

        match async_fs::metadata(&target).await {
            Ok(meta) if meta.is_file() => {}
            _ => return UploadResult::failure(404, "File not found"),
        }

        if let Err(e) = async_fs::remove_file(&target).await {
            tracing::error!("Failed to delete {}: {}", target.display(), e);
            return UploadResult::failure(500, "Delete failed");
        }

        tracing::info!("Deleted {}", relative);
        self.notify(UploadEvent::ImageDeleted { path: relative.clone() });

        UploadResult {
            state: true,
            url: relative.clone(),
            filename: basename(&relative),
            original: String::new(),
            file_type: String::new(),
            size: String::new(),
            code: 200,
            message: "File deleted".to_string(),
        }
    }

    /// Stage the bytes next to the destination, then rename into place so a
    /// half-written file is never visible under its final name.
    async fn move_into_place(&self, relative: &str, data: &[u8]) -> Result<(), AppError> {
        let destination = self.public_root.join(relative);

        if let Some(parent) = destination.parent() {
            async_fs::create_dir_all(parent).await.map_err(|e| {
                AppError::storage_failed(format!("Failed to create destination directory: {}", e))
            })?;
        }

        let staging = self.public_root.join(format!(".{}.part", Uuid::new_v4()));
        async_fs::write(&staging, data)
            .await
            .map_err(|e| AppError::storage_failed(format!("Failed to write staging file: {}", e)))?;

        if let Err(e) = async_fs::rename(&staging, &destination).await {
            let _ = async_fs::remove_file(&staging).await;
            return Err(AppError::storage_failed(format!(
                "Failed to move upload into place: {}",
                e
            )));
        }

        Ok(())
    }

    // Dropped receivers are fine; nobody listening is not an error.
    fn notify(&self, event: UploadEvent) {
        let _ = self.events.send(event);
    }
}

/// Validate that a caller-supplied URL stays inside the public root.
/// Accepts a leading slash (URL form) but no parent or root components.
fn contained_path(url: &str) -> Result<String, AppError> {
    let trimmed = url.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(AppError::invalid_path("Empty path"));
    }

    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(_) => {}
            _ => return Err(AppError::invalid_path("Path escapes the upload root")),
        }
    }

    Ok(trimmed.to_string())
}

fn basename(relative: &str) -> String {
    relative.rsplit('/').next().unwrap_or(relative).to_string()
}

/// Human-readable size: unit picked from the decimal digit count of the
/// byte total, value divided by the matching power of 1024.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let digits = bytes.to_string().len();
    let factor = ((digits - 1) / 3).min(UNITS.len() - 1);

    format!(
        "{:.2}{}",
        bytes as f64 / 1024f64.powi(factor as i32),
        UNITS[factor]
    )
}
