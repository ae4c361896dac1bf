//! # Asset-Owning Entity Manager
//!
//! Create/update/delete lifecycle for entities whose images live in an
//! external asset store while the record lives in the database.
//!
//! ## Operation Ordering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(draft, files)                                                  │
//! │    validate draft + UploadPolicy ──✗──► Validation (no calls made)     │
//! │    precheck (name taken? category exists?)                             │
//! │    upload ALL files concurrently ──✗──► Upload (siblings leaked)       │
//! │    insert record with refs ────────✗──► Persistence (uploads leaked)   │
//! │                                                                         │
//! │  update(id, patch, files?)                                             │
//! │    validate id, patch, files                                           │
//! │    find record ────────────────────✗──► NotFound                       │
//! │    files given:                                                        │
//! │      delete ALL old assets ────────✗──► Upload (nothing uploaded)      │
//! │      upload ALL new files ─────────✗──► Upload                         │
//! │    merge patch, replace refs wholesale                                 │
//! │                                                                         │
//! │  remove(id)                                                            │
//! │    delete record ──────────────────✗──► NotFound                       │
//! │    delete ALL assets ──────────────✗──► logged, still Ok               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Batches fan out with `join_all`: one failure fails the batch, but calls
//! already in flight run to completion. Nothing is rolled back. Leaked
//! assets are logged at `warn` with their public ids.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use souq_core::validation::validate_uuid;
use souq_core::{AssetOwning, AssetRef, ListFilter, UploadFile, UploadPolicy};
use souq_media::{AssetStore, MediaError};

use crate::error::{ServiceError, ServiceResult};
use crate::repository::EntityRepository;

/// Generic lifecycle manager for one asset-owning entity type.
pub struct AssetManager<E: AssetOwning> {
    repository: Arc<dyn EntityRepository<E>>,
    store: Arc<dyn AssetStore>,
    policy: UploadPolicy,
}

impl<E: AssetOwning> Clone for AssetManager<E> {
    fn clone(&self) -> Self {
        AssetManager {
            repository: Arc::clone(&self.repository),
            store: Arc::clone(&self.store),
            policy: self.policy.clone(),
        }
    }
}

impl<E: AssetOwning> AssetManager<E> {
    pub fn new(
        repository: Arc<dyn EntityRepository<E>>,
        store: Arc<dyn AssetStore>,
        policy: UploadPolicy,
    ) -> Self {
        AssetManager {
            repository,
            store,
            policy,
        }
    }

    /// Upload limits applied by this manager.
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Creates an entity together with its initial assets.
    pub async fn create(&self, draft: E::Draft, files: &[UploadFile]) -> ServiceResult<E> {
        E::validate_draft(&draft)?;
        self.policy.validate(files)?;
        self.repository.precheck_draft(&draft).await?;

        let assets = self.upload_all(files).await?;

        let entity = match self.repository.insert(&draft, assets.clone()).await {
            Ok(entity) => entity,
            Err(err) => {
                warn!(
                    kind = E::KIND,
                    leaked = ?public_ids(&assets),
                    error = %err,
                    "Insert failed after upload; assets leaked"
                );
                return Err(err.into());
            }
        };

        info!(kind = E::KIND, id = %entity.id(), assets = assets.len(), "Entity created");
        Ok(entity)
    }

    /// Lists one page of entities.
    pub async fn list(&self, filter: &ListFilter) -> ServiceResult<Vec<E>> {
        Ok(self.repository.find(filter).await?)
    }

    /// Fetches an entity by id.
    pub async fn get(&self, id: &str) -> ServiceResult<E> {
        validate_uuid(id)?;
        self.find_existing(id).await
    }

    /// Updates scalar fields and, when `files` is non-empty, replaces every
    /// asset.
    ///
    /// An empty `files` slice is treated the same as `None`.
    pub async fn update(
        &self,
        id: &str,
        patch: E::Patch,
        files: Option<&[UploadFile]>,
    ) -> ServiceResult<E> {
        validate_uuid(id)?;
        E::validate_patch(&patch)?;

        let files = files.filter(|files| !files.is_empty());
        if let Some(files) = files {
            self.policy.validate(files)?;
        }

        let existing = self.find_existing(id).await?;
        self.repository.precheck_patch(id, &patch).await?;

        let replacement = match files {
            Some(files) => {
                self.delete_old_assets(&existing.assets()).await?;
                Some(self.upload_all(files).await?)
            }
            None => None,
        };

        let updated = self
            .repository
            .update_by_id(id, &patch, replacement.clone())
            .await?;

        match updated {
            Some(entity) => {
                info!(
                    kind = E::KIND,
                    id = %id,
                    replaced_assets = replacement.is_some(),
                    "Entity updated"
                );
                Ok(entity)
            }
            None => {
                // Deleted by a concurrent request after our lookup.
                if let Some(assets) = &replacement {
                    warn!(kind = E::KIND, id = %id, leaked = ?public_ids(assets), "Record vanished during update; assets leaked");
                }
                Err(ServiceError::not_found(E::KIND, id))
            }
        }
    }

    /// Deletes the record, then its assets.
    ///
    /// Asset delete failures are logged and do not fail the call.
    pub async fn remove(&self, id: &str) -> ServiceResult<E> {
        validate_uuid(id)?;

        let removed = self
            .repository
            .delete_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(E::KIND, id))?;

        let assets = removed.assets();
        for err in self.delete_all(&assets).await {
            warn!(kind = E::KIND, id = %id, error = %err, "Asset delete failed after record removal; asset leaked");
        }

        info!(kind = E::KIND, id = %id, assets = assets.len(), "Entity removed");
        Ok(removed)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn find_existing(&self, id: &str) -> ServiceResult<E> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(E::KIND, id))
    }

    /// Uploads every file concurrently, keeping the input order.
    async fn upload_all(&self, files: &[UploadFile]) -> ServiceResult<Vec<AssetRef>> {
        debug!(kind = E::KIND, count = files.len(), "Uploading batch");

        let results = join_all(files.iter().map(|file| self.store.upload(file))).await;

        let mut uploaded = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(asset) => uploaded.push(asset),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            None => Ok(uploaded),
            Some(err) => {
                if !uploaded.is_empty() {
                    warn!(kind = E::KIND, leaked = ?public_ids(&uploaded), "Upload batch failed; completed uploads leaked");
                }
                Err(err.into())
            }
        }
    }

    /// Deletes the assets being replaced by an update. Any failure aborts.
    async fn delete_old_assets(&self, assets: &[AssetRef]) -> ServiceResult<()> {
        let failures = self.delete_all(assets).await;
        match failures.into_iter().next() {
            Some(err) => {
                warn!(
                    kind = E::KIND,
                    assets = ?public_ids(assets),
                    error = %err,
                    "Replacing assets failed; record may reference deleted assets"
                );
                Err(err.into())
            }
            None => Ok(()),
        }
    }

    /// Deletes every asset concurrently and returns the failures.
    async fn delete_all(&self, assets: &[AssetRef]) -> Vec<MediaError> {
        join_all(assets.iter().map(|asset| self.store.delete(&asset.public_id)))
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }
}

fn public_ids(assets: &[AssetRef]) -> Vec<&str> {
    assets.iter().map(|asset| asset.public_id.as_str()).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
