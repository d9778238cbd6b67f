use crate::models::errors::AppError;
use crate::models::upload::IncomingFile;

/// Client-facing messages for each validation rule, configurable so
/// deployments can reword them.
#[derive(Debug, Clone)]
pub struct ValidationMessages {
    pub missing_file: String,
    pub bad_format: String,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self {
            missing_file: "Image is required".to_string(),
            bad_format: "Uploaded file is not in image format".to_string(),
        }
    }
}

/// Upload validation rules: presence plus an extension allow-list.
///
/// Fails closed and reports the first unmet rule; callers must not touch
/// the filesystem before this passes.
#[derive(Debug, Clone)]
pub struct UploadRules {
    pub allowed_extensions: Vec<String>,
    pub messages: ValidationMessages,
}

impl UploadRules {
    pub fn new(allowed_extensions: Vec<String>, messages: ValidationMessages) -> Self {
        Self { allowed_extensions, messages }
    }

    /// Check an (optional) incoming file against the rules, returning the
    /// file on success so callers can only proceed with a validated upload.
    pub fn validate<'a>(&self, file: Option<&'a IncomingFile>) -> Result<&'a IncomingFile, AppError> {
        let file = file
            .filter(|f| !f.data.is_empty())
            .ok_or_else(|| AppError::validation_failed(&self.messages.missing_file))?;

        let ext = file
            .extension()
            .ok_or_else(|| AppError::validation_failed(&self.messages.bad_format))?;

        if !self
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        {
            return Err(AppError::validation_failed(&self.messages.bad_format));
        }

        Ok(file)
    }
}

impl Default for UploadRules {
    fn default() -> Self {
        Self {
            allowed_extensions: ["png", "gif", "jpeg", "jpg", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            messages: ValidationMessages::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_named(name: &str) -> IncomingFile {
        IncomingFile {
            original_name: name.to_string(),
            content_type: None,
            data: vec![0u8; 16],
        }
    }

    #[test]
    fn accepts_allowed_extension() {
        let rules = UploadRules::default();
        assert!(rules.validate(Some(&file_named("photo.png"))).is_ok());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let rules = UploadRules::default();
        assert!(rules.validate(Some(&file_named("photo.PNG"))).is_ok());
        assert!(rules.validate(Some(&file_named("photo.Jpeg"))).is_ok());
    }

    #[test]
    fn rejects_disallowed_extension_with_configured_message() {
        let rules = UploadRules::default();
        let err = rules.validate(Some(&file_named("notes.txt"))).unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.message(), "Uploaded file is not in image format");
    }

    #[test]
    fn rejects_missing_file() {
        let rules = UploadRules::default();
        let err = rules.validate(None).unwrap_err();
        assert_eq!(err.status(), 400);
        assert_eq!(err.message(), "Image is required");
    }

    #[test]
    fn rejects_empty_file_as_missing() {
        let rules = UploadRules::default();
        let mut file = file_named("photo.png");
        file.data.clear();
        let err = rules.validate(Some(&file)).unwrap_err();
        assert_eq!(err.message(), "Image is required");
    }

    #[test]
    fn rejects_filename_without_extension() {
        let rules = UploadRules::default();
        let err = rules.validate(Some(&file_named("noextension"))).unwrap_err();
        assert_eq!(err.message(), "Uploaded file is not in image format");
    }
}
