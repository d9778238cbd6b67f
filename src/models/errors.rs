use thiserror::Error;

/// Error taxonomy for the upload core.
///
/// Every variant carries the message reported to the client; status mapping
/// is fixed per variant so handlers never pick codes ad hoc.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn validation_failed(message: impl Into<String>) -> Self {
        AppError::Validation { message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound { message: message.into() }
    }

    pub fn invalid_path(message: impl Into<String>) -> Self {
        AppError::InvalidPath { message: message.into() }
    }

    pub fn storage_failed(message: impl Into<String>) -> Self {
        AppError::Storage { message: message.into() }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        AppError::Internal { message: message.into() }
    }

    /// HTTP status code the variant maps to.
    pub fn status(&self) -> u16 {
        match self {
            AppError::Validation { .. } | AppError::InvalidPath { .. } => 400,
            AppError::NotFound { .. } => 404,
            AppError::Storage { .. } | AppError::Internal { .. } => 500,
        }
    }

    /// The client-facing message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message }
            | AppError::NotFound { message }
            | AppError::InvalidPath { message }
            | AppError::Storage { message }
            | AppError::Internal { message } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(AppError::validation_failed("x").status(), 400);
        assert_eq!(AppError::invalid_path("x").status(), 400);
        assert_eq!(AppError::not_found("x").status(), 404);
        assert_eq!(AppError::storage_failed("x").status(), 500);
    }

    #[test]
    fn message_has_no_prefix() {
        let err = AppError::validation_failed("Image is required");
        assert_eq!(err.message(), "Image is required");
        assert_eq!(err.to_string(), "Validation failed: Image is required");
    }
}
