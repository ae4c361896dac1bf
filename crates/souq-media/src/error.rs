//! # Media Error Types

use thiserror::Error;

/// Errors raised by an [`AssetStore`](crate::AssetStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The store did not accept an upload.
    #[error("Upload of '{file_name}' failed: {reason}")]
    UploadFailed { file_name: String, reason: String },

    /// The store could not delete an asset.
    #[error("Delete of '{public_id}' failed: {reason}")]
    DeleteFailed { public_id: String, reason: String },

    /// The store is misconfigured (missing credentials, bad endpoint).
    #[error("Asset store misconfigured: {0}")]
    Config(String),
}

impl MediaError {
    pub fn upload(file_name: impl Into<String>, reason: impl ToString) -> Self {
        MediaError::UploadFailed {
            file_name: file_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn delete(public_id: impl Into<String>, reason: impl ToString) -> Self {
        MediaError::DeleteFailed {
            public_id: public_id.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for asset store operations.
pub type MediaResult<T> = Result<T, MediaError>;
