//! # souq-media: Binary Asset Storage
//!
//! Abstraction over the external store that holds category and product
//! images.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  upload(file)       → AssetRef { url, public_id }                      │
//! │  delete(public_id)  → ()                                               │
//! │                                                                         │
//! │  • Each call is independent; there is no batch or transaction.         │
//! │  • Deleting an id the store no longer knows about is a success.        │
//! │  • No retries at this layer.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Implementations
//! - [`CloudinaryStore`] - production store talking to the Cloudinary API
//! - [`MemoryAssetStore`] - in-process store with call recording and
//!   failure injection

pub mod cloudinary;
pub mod error;
pub mod memory;

use async_trait::async_trait;

use souq_core::{AssetRef, UploadFile};

pub use cloudinary::{CloudinaryConfig, CloudinaryStore};
pub use error::{MediaError, MediaResult};
pub use memory::MemoryAssetStore;

/// Store for binary assets referenced by entity records.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Stores one file and returns its reference.
    async fn upload(&self, file: &UploadFile) -> MediaResult<AssetRef>;

    /// Removes the asset with the given public id.
    async fn delete(&self, public_id: &str) -> MediaResult<()>;
}
