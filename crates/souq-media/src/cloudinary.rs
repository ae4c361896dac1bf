//! # Cloudinary Asset Store
//!
//! Signed REST client for the Cloudinary image API.
//!
//! ## Request Signing
//! ```text
//! params (excluding file, api_key, signature*):
//!     folder=products, timestamp=1700000000
//!          │
//!          ▼  sort by name, join as k=v with '&'
//!     "folder=products&timestamp=1700000000"
//!          │
//!          ▼  append api_secret, SHA-256, hex
//!     signature=49d1a6d8...
//! ```
//!
//! Requests carry `signature_algorithm=sha256` so Cloudinary verifies with
//! SHA-256 instead of its SHA-1 default.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use souq_core::{AssetRef, UploadFile};

use crate::error::{MediaError, MediaResult};
use crate::AssetStore;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Configuration
// =============================================================================

/// Cloudinary account credentials and upload options.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder uploads are placed in; `None` uploads to the account root.
    pub folder: Option<String>,
    pub timeout: Duration,
}

impl CloudinaryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        CloudinaryConfig {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            folder: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        let folder = folder.into();
        self.folder = (!folder.trim().is_empty()).then_some(folder);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("folder", &self.folder)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

// =============================================================================
// Store
// =============================================================================

/// [`AssetStore`] backed by Cloudinary.
pub struct CloudinaryStore {
    http: Client,
    config: CloudinaryConfig,
}

impl CloudinaryStore {
    /// Creates a store, rejecting blank credentials up front.
    pub fn new(config: CloudinaryConfig) -> MediaResult<Self> {
        for (name, value) in [
            ("cloud_name", &config.cloud_name),
            ("api_key", &config.api_key),
            ("api_secret", &config.api_secret),
        ] {
            if value.trim().is_empty() {
                return Err(MediaError::Config(format!("{name} is empty")));
            }
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MediaError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(CloudinaryStore { http, config })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", API_BASE, self.config.cloud_name, action)
    }

    /// Signed parameters common to every request.
    fn signed_params(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        params.push(("timestamp", Utc::now().timestamp().to_string()));
        let signature = sign_params(&params, &self.config.api_secret);

        params.push(("api_key", self.config.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    async fn upload(&self, file: &UploadFile) -> MediaResult<AssetRef> {
        let mut params = Vec::new();
        if let Some(folder) = &self.config.folder {
            params.push(("folder", folder.clone()));
        }

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| MediaError::upload(&file.file_name, e))?;

        let form = self
            .signed_params(params)
            .into_iter()
            .fold(Form::new().part("file", part), |form, (name, value)| {
                form.text(name, value)
            });

        debug!(file_name = %file.file_name, size = file.size(), "Uploading to Cloudinary");

        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::upload(&file.file_name, e))?;

        let response = check_status(response)
            .await
            .map_err(|reason| MediaError::upload(&file.file_name, reason))?;

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::upload(&file.file_name, e))?;

        debug!(public_id = %body.public_id, "Upload complete");
        Ok(AssetRef::new(body.secure_url, body.public_id))
    }

    async fn delete(&self, public_id: &str) -> MediaResult<()> {
        let params = self.signed_params(vec![("public_id", public_id.to_string())]);

        debug!(public_id = %public_id, "Deleting from Cloudinary");

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| MediaError::delete(public_id, e))?;

        let response = check_status(response)
            .await
            .map_err(|reason| MediaError::delete(public_id, reason))?;

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| MediaError::delete(public_id, e))?;

        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                warn!(public_id = %public_id, "Asset already absent from Cloudinary");
                Ok(())
            }
            other => Err(MediaError::delete(public_id, format!("unexpected result '{other}'"))),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Computes the request signature for a set of parameters.
fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, value)| !value.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Passes successful responses through; turns failures into a short reason.
async fn check_status(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(format!("HTTP {}: {}", status, error_message(&body)))
}

/// Extracts `error.message` from a Cloudinary error body, falling back to
/// the first 200 characters of the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}

// =============================================================================
// Unit Tests
// =============================================================================
