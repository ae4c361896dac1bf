//! Product catalog service.
//!
//! Lifecycle operations go through [`AssetManager<Product>`]; reads that
//! need the owning category go straight to the database.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use souq_core::{
    Category, NewProduct, PageQuery, Product, ProductDetails, ProductPatch, UploadFile,
    UploadPolicy,
};
use souq_db::Database;
use souq_media::AssetStore;

use crate::error::ServiceResult;
use crate::manager::AssetManager;

#[derive(Clone)]
pub struct ProductService {
    manager: AssetManager<Product>,
    db: Database,
    page_size: u32,
}

impl ProductService {
    pub fn new(
        db: Database,
        store: Arc<dyn AssetStore>,
        policy: UploadPolicy,
        page_size: u32,
    ) -> Self {
        ProductService {
            manager: AssetManager::<Product>::new(Arc::new(db.clone()), store, policy),
            db,
            page_size,
        }
    }

    /// Creates a product. A referenced category must already exist.
    pub async fn create(&self, draft: NewProduct, files: &[UploadFile]) -> ServiceResult<Product> {
        self.manager.create(draft, files).await
    }

    /// One page of products, optionally filtered by title.
    pub async fn list(&self, query: &PageQuery) -> ServiceResult<Vec<Product>> {
        let filter = query.to_filter(self.page_size)?;
        self.manager.list(&filter).await
    }

    /// One page of products with their categories resolved.
    ///
    /// The page's categories are loaded with a single query.
    pub async fn list_details(&self, query: &PageQuery) -> ServiceResult<Vec<ProductDetails>> {
        let products = self.list(query).await?;

        let mut category_ids: Vec<String> = products
            .iter()
            .filter_map(|product| product.category_id.clone())
            .collect();
        category_ids.sort();
        category_ids.dedup();

        let categories: HashMap<String, Category> = self
            .db
            .categories()
            .get_many(&category_ids)
            .await?
            .into_iter()
            .map(|category| (category.id.clone(), category))
            .collect();

        debug!(products = products.len(), categories = categories.len(), "Loaded product page");

        Ok(products
            .into_iter()
            .map(|product| {
                let category = product
                    .category_id
                    .as_ref()
                    .and_then(|id| categories.get(id))
                    .cloned();
                ProductDetails { product, category }
            })
            .collect())
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Product> {
        self.manager.get(id).await
    }

    /// Fetches a product with its category resolved.
    ///
    /// A product whose category has since been deleted comes back with
    /// `category: None`.
    pub async fn get_details(&self, id: &str) -> ServiceResult<ProductDetails> {
        let product = self.manager.get(id).await?;

        let category = match &product.category_id {
            Some(category_id) => self.db.categories().get_by_id(category_id).await?,
            None => None,
        };

        debug!(id = %id, has_category = category.is_some(), "Loaded product details");
        Ok(ProductDetails { product, category })
    }

    /// Updates a product. The category is fixed at creation.
    pub async fn update(
        &self,
        id: &str,
        patch: ProductPatch,
        files: Option<&[UploadFile]>,
    ) -> ServiceResult<Product> {
        self.manager.update(id, patch, files).await
    }

    pub async fn remove(&self, id: &str) -> ServiceResult<Product> {
        self.manager.remove(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use souq_core::{NewCategory, ValidationError};
    use souq_db::DbConfig;
    use souq_media::MemoryAssetStore;

    async fn setup() -> (Database, ProductService, Arc<MemoryAssetStore>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(MemoryAssetStore::new());
        let service = ProductService::new(
            db.clone(),
            store.clone(),
            UploadPolicy::product_images(),
            4,
        );
        (db, service, store)
    }

    fn draft(category_id: Option<String>) -> NewProduct {
        NewProduct {
            title: "Hiking boot".into(),
            description: "Waterproof leather boot".into(),
            price_cents: 12_999,
            category_id,
            rate: Some(4),
            number_of_sales: None,
        }
    }

    fn png() -> UploadFile {
        UploadFile::new("boot.png", "image/png", vec![1, 2, 3])
    }

    #[tokio::test]
    async fn test_details_include_category() {
        let (db, service, _) = setup().await;
        let category = db
            .categories()
            .insert(
                &NewCategory {
                    name: "Shoes".into(),
                    description: "Footwear category long enough".into(),
                },
                None,
            )
            .await
            .unwrap();

        let product = service
            .create(draft(Some(category.id.clone())), &[png()])
            .await
            .unwrap();
        assert_eq!(product.rate, 4);

        let details = service.get_details(&product.id).await.unwrap();
        assert_eq!(details.product.id, product.id);
        assert_eq!(details.category.unwrap().name, "Shoes");
    }

    #[tokio::test]
    async fn test_missing_category_rejected_before_upload() {
        let (_, service, store) = setup().await;

        let err = service
            .create(
                draft(Some("550e8400-e29b-41d4-a716-446655440000".into())),
                &[png()],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(ValidationError::InvalidFormat { .. })));
        assert!(store.upload_attempts().await.is_empty());
    }

    #[tokio::test]
    async fn test_list_keyword_and_page_size() {
        let (_, service, _) = setup().await;
        for title in ["Boot A", "Boot B", "Sandal", "Boot C", "Boot D", "Boot E"] {
            let mut d = draft(None);
            d.title = title.into();
            service.create(d, &[png()]).await.unwrap();
        }

        let query = PageQuery::new(None, Some("boot"));
        assert_eq!(service.list(&query).await.unwrap().len(), 4);

        let query = PageQuery::new(Some(2), Some("boot"));
        let page = service.list(&query).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Boot E");
    }

    #[tokio::test]
    async fn test_list_details_resolves_categories() {
        let (db, service, _) = setup().await;
        let category = db
            .categories()
            .insert(
                &NewCategory {
                    name: "Shoes".into(),
                    description: "Footwear category long enough".into(),
                },
                None,
            )
            .await
            .unwrap();

        service
            .create(draft(Some(category.id.clone())), &[png()])
            .await
            .unwrap();
        service
            .create(draft(Some(category.id.clone())), &[png()])
            .await
            .unwrap();
        service.create(draft(None), &[png()]).await.unwrap();

        let page = service.list_details(&PageQuery::default()).await.unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].category.as_ref().unwrap().id, category.id);
        assert_eq!(page[1].category.as_ref().unwrap().name, "Shoes");
        assert!(page[2].category.is_none());
    }
}
