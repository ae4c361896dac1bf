//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::str::FromStr;

use souq_core::{DEFAULT_MAX_FILE_BYTES, DEFAULT_PAGE_SIZE, MAX_PRODUCT_IMAGES};
use souq_media::CloudinaryConfig;

/// Default token lifetime: three days.
const DEFAULT_JWT_LIFETIME_SECS: i64 = 3 * 24 * 60 * 60;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// JWT signing secret
    pub jwt_secret: String,

    /// JWT lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Cloudinary credentials; `None` selects the in-memory asset store
    pub cloudinary: Option<CloudinaryConfig>,

    /// Per-file upload cap in bytes
    pub upload_max_file_bytes: usize,

    /// Maximum images per product
    pub max_product_images: usize,

    /// Items per list page
    pub page_size: u32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ApiConfig {
            http_port: parse_or(&lookup, "HTTP_PORT", 3000)?,

            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "./souq.db".to_string()),

            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| {
                // Development only; production deployments must set JWT_SECRET
                "souq-dev-secret-change-in-production".to_string()
            }),

            jwt_lifetime_secs: parse_or(&lookup, "JWT_LIFETIME_SECS", DEFAULT_JWT_LIFETIME_SECS)?,

            cloudinary: cloudinary_from(&lookup)?,

            upload_max_file_bytes: parse_or(&lookup, "UPLOAD_MAX_FILE_BYTES", DEFAULT_MAX_FILE_BYTES)?,

            max_product_images: parse_or(&lookup, "MAX_PRODUCT_IMAGES", MAX_PRODUCT_IMAGES)?,

            page_size: parse_or(&lookup, "PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
        };

        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }
        if config.page_size == 0 {
            return Err(ConfigError::InvalidValue("PAGE_SIZE".to_string()));
        }
        if config.max_product_images == 0 {
            return Err(ConfigError::InvalidValue("MAX_PRODUCT_IMAGES".to_string()));
        }

        Ok(config)
    }

    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.http_port)
    }

    /// Largest request body the server accepts: a full product gallery plus
    /// room for the text fields.
    pub fn body_limit(&self) -> usize {
        self.upload_max_file_bytes
            .saturating_mul(self.max_product_images)
            .saturating_add(64 * 1024)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

fn cloudinary_from<F>(lookup: &F) -> Result<Option<CloudinaryConfig>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let cloud_name = lookup("CLOUDINARY_CLOUD_NAME");
    let api_key = lookup("CLOUDINARY_API_KEY");
    let api_secret = lookup("CLOUDINARY_API_SECRET");

    match (cloud_name, api_key, api_secret) {
        (None, None, None) => Ok(None),
        (Some(cloud_name), Some(api_key), Some(api_secret)) => {
            let folder = lookup("CLOUDINARY_FOLDER").unwrap_or_else(|| "products".to_string());
            Ok(Some(
                CloudinaryConfig::new(cloud_name, api_key, api_secret).with_folder(folder),
            ))
        }
        _ => Err(ConfigError::MissingRequired(
            "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set together"
                .to_string(),
        )),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.database_path, "./souq.db");
        assert_eq!(config.jwt_lifetime_secs, 259_200);
        assert_eq!(config.upload_max_file_bytes, 2 * 1024 * 1024);
        assert_eq!(config.max_product_images, 5);
        assert_eq!(config.page_size, 4);
        assert!(config.cloudinary.is_none());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[("HTTP_PORT", "8080"), ("PAGE_SIZE", "10")]).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn test_invalid_number() {
        let err = load(&[("HTTP_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key) if key == "HTTP_PORT"));

        assert!(load(&[("PAGE_SIZE", "0")]).is_err());
    }

    #[test]
    fn test_cloudinary_all_or_nothing() {
        let err = load(&[("CLOUDINARY_CLOUD_NAME", "demo")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));

        let config = load(&[
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
        ])
        .unwrap();
        let cloudinary = config.cloudinary.unwrap();
        assert_eq!(cloudinary.cloud_name, "demo");
        assert_eq!(cloudinary.folder.as_deref(), Some("products"));
    }

    #[test]
    fn test_body_limit_covers_gallery() {
        let config = load(&[]).unwrap();
        assert!(config.body_limit() > 5 * 2 * 1024 * 1024);
    }
}
