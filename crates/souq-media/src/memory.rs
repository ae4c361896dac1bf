//! # In-Memory Asset Store
//!
//! Keeps "uploaded" assets in a map and records every call. Used by the
//! service tests and as a fallback when no Cloudinary credentials are
//! configured.
//!
//! ## Failure Injection
//! ```text
//! store.fail_uploads_named("bad.png")   → upload of bad.png returns UploadFailed
//! store.fail_deletes(true)              → every delete returns DeleteFailed
//! ```
//! Other calls keep succeeding, so partial-failure sequences can be
//! reproduced exactly.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use souq_core::{AssetRef, UploadFile};

use crate::error::{MediaError, MediaResult};
use crate::AssetStore;

#[derive(Debug, Default)]
struct State {
    /// Live assets by public id.
    assets: BTreeMap<String, AssetRef>,
    /// File names of every upload attempt, in call order.
    upload_attempts: Vec<String>,
    /// Public ids of every delete attempt, in call order.
    delete_attempts: Vec<String>,
    failing_uploads: HashSet<String>,
    fail_deletes: bool,
}

/// [`AssetStore`] that keeps everything in process memory.
#[derive(Debug)]
pub struct MemoryAssetStore {
    folder: String,
    state: Mutex<State>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        MemoryAssetStore::with_folder("memory")
    }

    /// Creates a store whose public ids are prefixed with `folder/`.
    pub fn with_folder(folder: impl Into<String>) -> Self {
        MemoryAssetStore {
            folder: folder.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Makes every future upload of `file_name` fail.
    pub async fn fail_uploads_named(&self, file_name: impl Into<String>) {
        self.state.lock().await.failing_uploads.insert(file_name.into());
    }

    /// Turns delete failures on or off.
    pub async fn fail_deletes(&self, fail: bool) {
        self.state.lock().await.fail_deletes = fail;
    }

    /// Assets currently held, ordered by public id.
    pub async fn assets(&self) -> Vec<AssetRef> {
        self.state.lock().await.assets.values().cloned().collect()
    }

    pub async fn contains(&self, public_id: &str) -> bool {
        self.state.lock().await.assets.contains_key(public_id)
    }

    /// File names passed to `upload`, including failed attempts.
    pub async fn upload_attempts(&self) -> Vec<String> {
        self.state.lock().await.upload_attempts.clone()
    }

    /// Public ids passed to `delete`, including failed attempts.
    pub async fn delete_attempts(&self) -> Vec<String> {
        self.state.lock().await.delete_attempts.clone()
    }
}

impl Default for MemoryAssetStore {
    fn default() -> Self {
        MemoryAssetStore::new()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn upload(&self, file: &UploadFile) -> MediaResult<AssetRef> {
        let mut state = self.state.lock().await;
        state.upload_attempts.push(file.file_name.clone());

        if state.failing_uploads.contains(&file.file_name) {
            return Err(MediaError::upload(&file.file_name, "injected failure"));
        }

        let public_id = format!("{}/{}", self.folder, Uuid::new_v4().simple());
        let asset = AssetRef::new(
            format!("memory://{}/{}", public_id, file.file_name),
            public_id.clone(),
        );

        debug!(public_id = %public_id, size = file.size(), "Stored asset in memory");
        state.assets.insert(public_id, asset.clone());
        Ok(asset)
    }

    async fn delete(&self, public_id: &str) -> MediaResult<()> {
        let mut state = self.state.lock().await;
        state.delete_attempts.push(public_id.to_string());

        if state.fail_deletes {
            return Err(MediaError::delete(public_id, "injected failure"));
        }

        // Unknown ids are treated as already deleted.
        state.assets.remove(public_id);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str) -> UploadFile {
        UploadFile::new(name, "image/png", vec![1, 2, 3])
    }

    #[tokio::test]
    async fn test_upload_then_delete() {
        let store = MemoryAssetStore::with_folder("products");
        let asset = store.upload(&png("a.png")).await.unwrap();

        assert!(asset.public_id.starts_with("products/"));
        assert!(asset.url.ends_with("/a.png"));
        assert!(store.contains(&asset.public_id).await);

        store.delete(&asset.public_id).await.unwrap();
        assert!(!store.contains(&asset.public_id).await);
        assert_eq!(store.delete_attempts().await, vec![asset.public_id]);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_succeeds() {
        let store = MemoryAssetStore::new();
        assert!(store.delete("memory/never-existed").await.is_ok());
    }

    #[tokio::test]
    async fn test_injected_upload_failure_only_hits_named_file() {
        let store = MemoryAssetStore::new();
        store.fail_uploads_named("bad.png").await;

        let err = store.upload(&png("bad.png")).await.unwrap_err();
        assert!(matches!(err, MediaError::UploadFailed { ref file_name, .. } if file_name == "bad.png"));
        assert!(store.upload(&png("good.png")).await.is_ok());

        assert_eq!(store.upload_attempts().await, vec!["bad.png", "good.png"]);
        assert_eq!(store.assets().await.len(), 1);
    }

    #[tokio::test]
    async fn test_injected_delete_failure_keeps_asset() {
        let store = MemoryAssetStore::new();
        let asset = store.upload(&png("a.png")).await.unwrap();

        store.fail_deletes(true).await;
        assert!(store.delete(&asset.public_id).await.is_err());
        assert!(store.contains(&asset.public_id).await);

        store.fail_deletes(false).await;
        assert!(store.delete(&asset.public_id).await.is_ok());
    }
}
