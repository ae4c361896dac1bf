//! # Service Error Types
//!
//! ## Error Mapping
//! ```text
//! ValidationError                  → ServiceError::Validation
//! DbError::UniqueViolation         → ServiceError::Validation (Duplicate)
//! DbError::NotFound                → ServiceError::NotFound
//! DbError (anything else)          → ServiceError::Persistence
//! MediaError                       → ServiceError::Upload
//! ```

use thiserror::Error;

use souq_core::ValidationError;
use souq_db::DbError;
use souq_media::MediaError;

/// Errors surfaced by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad input. Raised before any side effect.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The identifier does not resolve. No side effect was attempted.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The asset store failed. Earlier steps of the operation may already
    /// have taken effect.
    #[error("Asset store failure: {0}")]
    Upload(#[from] MediaError),

    /// The database failed. Asset store side effects may already have
    /// taken effect.
    #[error("Persistence failure: {0}")]
    Persistence(DbError),

    /// Missing or bad credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Token signing or password hashing failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        ServiceError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { field, value } => {
                ServiceError::Validation(ValidationError::Duplicate { field, value })
            }
            DbError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            other => ServiceError::Persistence(other),
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
