//! # Entity Repository Contract
//!
//! The persistence side of the asset-owning lifecycle, as seen by
//! [`AssetManager`](crate::AssetManager).
//!
//! ```text
//! insert(draft, assets)            → E
//! find_by_id(id)                   → Option<E>
//! find(filter)                     → Vec<E>
//! update_by_id(id, patch, assets?) → Option<E>   (field merge; assets replace)
//! delete_by_id(id)                 → Option<E>
//! ```
//!
//! [`Database`] implements the contract for both categories and products.

use async_trait::async_trait;

use souq_core::{
    AssetOwning, AssetRef, Category, CategoryPatch, ListFilter, NewCategory, NewProduct, Product,
    ProductPatch, ValidationError,
};
use souq_db::{Database, DbResult};

use crate::error::ServiceResult;

/// Document-store operations for one asset-owning entity type.
#[async_trait]
pub trait EntityRepository<E: AssetOwning>: Send + Sync {
    /// Stores a new record carrying `assets`.
    async fn insert(&self, draft: &E::Draft, assets: Vec<AssetRef>) -> DbResult<E>;

    async fn find_by_id(&self, id: &str) -> DbResult<Option<E>>;

    async fn find(&self, filter: &ListFilter) -> DbResult<Vec<E>>;

    /// Merges `patch` into the record. `Some(assets)` replaces the stored
    /// references wholesale; `None` leaves them untouched.
    async fn update_by_id(
        &self,
        id: &str,
        patch: &E::Patch,
        assets: Option<Vec<AssetRef>>,
    ) -> DbResult<Option<E>>;

    async fn delete_by_id(&self, id: &str) -> DbResult<Option<E>>;

    /// Checks a draft against stored state (uniqueness, references) before
    /// anything is uploaded.
    async fn precheck_draft(&self, _draft: &E::Draft) -> ServiceResult<()> {
        Ok(())
    }

    /// Same as [`precheck_draft`](Self::precheck_draft) for updates.
    async fn precheck_patch(&self, _id: &str, _patch: &E::Patch) -> ServiceResult<()> {
        Ok(())
    }
}

// =============================================================================
// Categories
// =============================================================================

#[async_trait]
impl EntityRepository<Category> for Database {
    async fn insert(&self, draft: &NewCategory, assets: Vec<AssetRef>) -> DbResult<Category> {
        self.categories().insert(draft, assets.first()).await
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        self.categories().get_by_id(id).await
    }

    async fn find(&self, filter: &ListFilter) -> DbResult<Vec<Category>> {
        self.categories().find(filter).await
    }

    async fn update_by_id(
        &self,
        id: &str,
        patch: &CategoryPatch,
        assets: Option<Vec<AssetRef>>,
    ) -> DbResult<Option<Category>> {
        let image = assets.as_ref().and_then(|assets| assets.first());
        self.categories().update(id, patch, image).await
    }

    async fn delete_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        self.categories().delete(id).await
    }

    async fn precheck_draft(&self, draft: &NewCategory) -> ServiceResult<()> {
        if self.categories().get_by_name(&draft.name).await?.is_some() {
            return Err(ValidationError::duplicate("name", &draft.name).into());
        }
        Ok(())
    }

    async fn precheck_patch(&self, id: &str, patch: &CategoryPatch) -> ServiceResult<()> {
        let Some(name) = &patch.name else {
            return Ok(());
        };

        match self.categories().get_by_name(name).await? {
            Some(other) if other.id != id => Err(ValidationError::duplicate("name", name).into()),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Products
// =============================================================================

#[async_trait]
impl EntityRepository<Product> for Database {
    async fn insert(&self, draft: &NewProduct, assets: Vec<AssetRef>) -> DbResult<Product> {
        self.products().insert(draft, &assets).await
    }

    async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        self.products().get_by_id(id).await
    }

    async fn find(&self, filter: &ListFilter) -> DbResult<Vec<Product>> {
        self.products().find(filter).await
    }

    async fn update_by_id(
        &self,
        id: &str,
        patch: &ProductPatch,
        assets: Option<Vec<AssetRef>>,
    ) -> DbResult<Option<Product>> {
        self.products().update(id, patch, assets.as_deref()).await
    }

    async fn delete_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        self.products().delete(id).await
    }

    async fn precheck_draft(&self, draft: &NewProduct) -> ServiceResult<()> {
        let Some(category_id) = &draft.category_id else {
            return Ok(());
        };

        if self.categories().get_by_id(category_id).await?.is_none() {
            return Err(ValidationError::invalid("category", "no category with this id").into());
        }
        Ok(())
    }
}
