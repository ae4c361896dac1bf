//! Category catalog service.
//!
//! A thin wrapper over [`AssetManager<Category>`] that applies the
//! single-image upload policy and the configured page size.

use std::sync::Arc;

use souq_core::{Category, CategoryPatch, NewCategory, PageQuery, UploadFile, UploadPolicy};
use souq_db::Database;
use souq_media::AssetStore;

use crate::error::ServiceResult;
use crate::manager::AssetManager;

#[derive(Clone)]
pub struct CategoryService {
    manager: AssetManager<Category>,
    page_size: u32,
}

impl CategoryService {
    /// `policy` should allow a single file; categories carry one image.
    pub fn new(
        db: Database,
        store: Arc<dyn AssetStore>,
        policy: UploadPolicy,
        page_size: u32,
    ) -> Self {
        CategoryService {
            manager: AssetManager::<Category>::new(Arc::new(db), store, policy),
            page_size,
        }
    }

    pub async fn create(&self, draft: NewCategory, files: &[UploadFile]) -> ServiceResult<Category> {
        self.manager.create(draft, files).await
    }

    /// One page of categories, optionally filtered by name.
    pub async fn list(&self, query: &PageQuery) -> ServiceResult<Vec<Category>> {
        let filter = query.to_filter(self.page_size)?;
        self.manager.list(&filter).await
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Category> {
        self.manager.get(id).await
    }

    pub async fn update(
        &self,
        id: &str,
        patch: CategoryPatch,
        files: Option<&[UploadFile]>,
    ) -> ServiceResult<Category> {
        self.manager.update(id, patch, files).await
    }

    pub async fn remove(&self, id: &str) -> ServiceResult<Category> {
        self.manager.remove(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use souq_db::DbConfig;
    use souq_media::MemoryAssetStore;

    #[tokio::test]
    async fn test_list_uses_page_size() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = CategoryService::new(
            db,
            Arc::new(MemoryAssetStore::new()),
            UploadPolicy::single_image(),
            2,
        );

        for name in ["Shoes", "Shirts", "Hats"] {
            let draft = NewCategory {
                name: name.into(),
                description: "A category for testing".into(),
            };
            let image = UploadFile::new("c.png", "image/png", vec![1]);
            service.create(draft, &[image]).await.unwrap();
        }

        let first = service.list(&PageQuery::default()).await.unwrap();
        let second = service.list(&PageQuery::new(Some(2), None)).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "Hats");
    }

    #[tokio::test]
    async fn test_two_images_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = CategoryService::new(
            db,
            Arc::new(MemoryAssetStore::new()),
            UploadPolicy::single_image(),
            4,
        );

        let draft = NewCategory {
            name: "Shoes".into(),
            description: "Footwear category long enough".into(),
        };
        let files = [
            UploadFile::new("a.png", "image/png", vec![1]),
            UploadFile::new("b.png", "image/png", vec![1]),
        ];
        assert!(service.create(draft, &files).await.is_err());
    }
}
