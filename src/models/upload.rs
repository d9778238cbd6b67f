use mime::Mime;
use serde::Serialize;
use std::path::Path;

/// A single file extracted from a multipart request.
///
/// Lives for one request only; the bytes are either moved into the public
/// root or discarded with the error response.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Filename as supplied by the client.
    pub original_name: String,
    /// Content type declared in the multipart field, if any.
    pub content_type: Option<Mime>,
    pub data: Vec<u8>,
}

impl IncomingFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// The client-declared extension, without the dot. `None` when the
    /// original name has no extension segment.
    pub fn extension(&self) -> Option<&str> {
        extension_of(&self.original_name)
    }
}

/// Extension segment of a filename, excluding the dot.
pub fn extension_of(name: &str) -> Option<&str> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
}

/// Fixed-shape response record for upload and delete operations.
///
/// `code` doubles as the HTTP status of the response carrying it.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    pub state: bool,
    pub url: String,
    pub filename: String,
    pub original: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub size: String,
    pub code: u16,
    pub message: String,
}

impl UploadResult {
    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        Self {
            state: false,
            url: String::new(),
            filename: String::new(),
            original: String::new(),
            file_type: String::new(),
            size: String::new(),
            code,
            message: message.into(),
        }
    }
}

/// Lifecycle notification published on the service's broadcast channel.
/// Emitted on success only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    ImageUploaded { original: String, file_type: String },
    ImageDeleted { path: String },
}
