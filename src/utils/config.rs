use std::env;

use crate::services::validator::{UploadRules, ValidationMessages};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Base directory generated paths are resolved under.
    pub public_root: String,
    /// Destination template; see `services::templater` for the tokens.
    pub upload_template: String,
    pub allowed_extensions: Vec<String>,
    pub missing_file_message: String,
    pub bad_format_message: String,
    pub max_file_size: usize,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let messages = ValidationMessages::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_root: "public".to_string(),
            upload_template: "uploads/carousel/{yyyy}{mm}{dd}/{time}{rand:6}".to_string(),
            allowed_extensions: ["png", "gif", "jpeg", "jpg", "bmp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            missing_file_message: messages.missing_file,
            bad_format_message: messages.bad_format,
            max_file_size: 10 * 1024 * 1024, // 10MB
            request_timeout_seconds: 30,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                config.port = port_num;
            }
        }

        if let Ok(public_root) = env::var("PUBLIC_ROOT") {
            config.public_root = public_root;
        }

        if let Ok(template) = env::var("UPLOAD_TEMPLATE") {
            config.upload_template = template;
        }

        if let Ok(extensions) = env::var("ALLOWED_EXTENSIONS") {
            config.allowed_extensions = extensions
                .split(',')
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(message) = env::var("MISSING_FILE_MESSAGE") {
            config.missing_file_message = message;
        }

        if let Ok(message) = env::var("BAD_FORMAT_MESSAGE") {
            config.bad_format_message = message;
        }

        if let Ok(max_size) = env::var("MAX_FILE_SIZE") {
            if let Ok(size) = max_size.parse::<usize>() {
                config.max_file_size = size;
            }
        }

        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECONDS") {
            if let Ok(timeout_num) = timeout.parse::<u64>() {
                config.request_timeout_seconds = timeout_num;
            }
        }

        config
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validation rules derived from the configured allow-list and messages.
    pub fn upload_rules(&self) -> UploadRules {
        UploadRules::new(
            self.allowed_extensions.clone(),
            ValidationMessages {
                missing_file: self.missing_file_message.clone(),
                bad_format: self.bad_format_message.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_config() {
        let config = AppConfig::default();
        assert_eq!(
            config.upload_template,
            "uploads/carousel/{yyyy}{mm}{dd}/{time}{rand:6}"
        );
        assert_eq!(
            config.allowed_extensions,
            vec!["png", "gif", "jpeg", "jpg", "bmp"]
        );
        assert_eq!(config.missing_file_message, "Image is required");
        assert_eq!(
            config.bad_format_message,
            "Uploaded file is not in image format"
        );
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }
}
