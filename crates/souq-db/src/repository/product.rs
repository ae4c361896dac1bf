//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Keyword search on the title
//! - CRUD with a JSON image gallery
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /products?keyword=boot&page=2                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ListFilter { keyword: "boot", limit: 4, offset: 4 }                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  title LIKE '%boot%' ESCAPE '\'   (ASCII case-insensitive)             │
//! │  ORDER BY rowid                   (insertion order)                    │
//! │  LIMIT 4 OFFSET 4                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use souq_core::{AssetRef, ListFilter, NewProduct, Product, ProductPatch, DEFAULT_PRODUCT_RATE};

use super::{from_document, generate_id, like_pattern, to_document};
use crate::error::{DbError, DbResult};

/// Row shape of the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRecord {
    id: String,
    title: String,
    description: String,
    price_cents: i64,
    category_id: Option<String>,
    rate: i64,
    number_of_sales: i64,
    images: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRecord> for Product {
    type Error = DbError;

    fn try_from(record: ProductRecord) -> DbResult<Self> {
        Ok(Product {
            images: from_document(&record.images)?,
            id: record.id,
            title: record.title,
            description: record.description,
            price_cents: record.price_cents,
            category_id: record.category_id,
            rate: record.rate,
            number_of_sales: record.number_of_sales,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let page = repo.find(&ListFilter::first(4)).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product with its gallery and returns the stored record.
    ///
    /// `rate` defaults to 1 and `number_of_sales` to 0 when absent.
    pub async fn insert(&self, draft: &NewProduct, images: &[AssetRef]) -> DbResult<Product> {
        let id = generate_id();
        let now = Utc::now();
        let images = to_document(images)?;

        debug!(id = %id, title = %draft.title, "Inserting product");

        let record = sqlx::query_as::<_, ProductRecord>(
            r#"
            INSERT INTO products (
                id, title, description, price_cents, category_id,
                rate, number_of_sales, images, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            RETURNING
                id, title, description, price_cents, category_id,
                rate, number_of_sales, images, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.price_cents)
        .bind(draft.category_id.as_deref())
        .bind(draft.rate.unwrap_or(DEFAULT_PRODUCT_RATE))
        .bind(draft.number_of_sales.unwrap_or(0))
        .bind(images)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        record.try_into()
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let record = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT
                id, title, description, price_cents, category_id,
                rate, number_of_sales, images, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Product::try_from).transpose()
    }

    /// Lists products in insertion order, optionally filtered by a
    /// case-insensitive substring of the title.
    pub async fn find(&self, filter: &ListFilter) -> DbResult<Vec<Product>> {
        let pattern = filter.keyword.as_deref().map(like_pattern);

        debug!(keyword = ?filter.keyword, limit = filter.limit, offset = filter.offset, "Listing products");

        let records = sqlx::query_as::<_, ProductRecord>(
            r#"
            SELECT
                id, title, description, price_cents, category_id,
                rate, number_of_sales, images, created_at, updated_at
            FROM products
            WHERE ?1 IS NULL OR title LIKE ?1 ESCAPE '\'
            ORDER BY rowid
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(pattern)
        .bind(i64::from(filter.limit))
        .bind(i64::from(filter.offset))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = records.len(), "Product listing returned rows");
        records.into_iter().map(Product::try_from).collect()
    }

    /// Applies a partial update.
    ///
    /// When `images` is given it replaces the whole gallery.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - the updated record
    /// * `Ok(None)` - no product with that ID
    pub async fn update(
        &self,
        id: &str,
        patch: &ProductPatch,
        images: Option<&[AssetRef]>,
    ) -> DbResult<Option<Product>> {
        let images = images.map(to_document).transpose()?;

        debug!(id = %id, replace_images = images.is_some(), "Updating product");

        let record = sqlx::query_as::<_, ProductRecord>(
            r#"
            UPDATE products
            SET
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                price_cents = COALESCE(?4, price_cents),
                images = COALESCE(?5, images),
                updated_at = ?6
            WHERE id = ?1
            RETURNING
                id, title, description, price_cents, category_id,
                rate, number_of_sales, images, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.price_cents)
        .bind(images)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        record.map(Product::try_from).transpose()
    }

    /// Deletes a product and returns the removed record.
    pub async fn delete(&self, id: &str) -> DbResult<Option<Product>> {
        debug!(id = %id, "Deleting product");

        let record = sqlx::query_as::<_, ProductRecord>(
            r#"
            DELETE FROM products
            WHERE id = ?1
            RETURNING
                id, title, description, price_cents, category_id,
                rate, number_of_sales, images, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Product::try_from).transpose()
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use souq_core::NewCategory;

    fn draft(title: &str) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            description: "Sturdy and comfortable".to_string(),
            price_cents: 4999,
            ..Default::default()
        }
    }

    fn gallery(n: usize) -> Vec<AssetRef> {
        (0..n)
            .map(|i| AssetRef::new(format!("https://img/{i}.png"), format!("products/{i}")))
            .collect()
    }

    #[tokio::test]
    async fn test_insert_applies_defaults() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = repo.insert(&draft("Boot"), &gallery(2)).await.unwrap();
        assert_eq!(product.rate, DEFAULT_PRODUCT_RATE);
        assert_eq!(product.number_of_sales, 0);
        assert_eq!(product.images, gallery(2));
        assert_eq!(repo.get_by_id(&product.id).await.unwrap().unwrap(), product);
    }

    #[tokio::test]
    async fn test_unknown_category_rejected_by_foreign_key() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut with_category = draft("Boot");
        with_category.category_id = Some("no-such-category".into());

        let err = db.products().insert(&with_category, &[]).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_deleting_category_detaches_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let category = db
            .categories()
            .insert(
                &NewCategory {
                    name: "Shoes".into(),
                    description: "All kinds of shoes".into(),
                },
                None,
            )
            .await
            .unwrap();

        let mut in_category = draft("Boot");
        in_category.category_id = Some(category.id.clone());
        let product = db.products().insert(&in_category, &[]).await.unwrap();

        db.categories().delete(&category.id).await.unwrap();

        let orphan = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(orphan.category_id, None);
    }

    #[tokio::test]
    async fn test_update_replaces_gallery_wholesale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        let product = repo.insert(&draft("Boot"), &gallery(3)).await.unwrap();

        let replacement = vec![AssetRef::new("https://img/new.png", "products/new")];
        let patch = ProductPatch {
            price_cents: Some(100),
            ..Default::default()
        };
        let updated = repo
            .update(&product.id, &patch, Some(&replacement))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.images, replacement);
        assert_eq!(updated.price_cents, 100);
        assert_eq!(updated.title, "Boot");

        let untouched = repo
            .update(&product.id, &ProductPatch::default(), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.images, replacement);
    }

    #[tokio::test]
    async fn test_find_by_title_keyword() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        for title in ["Hiking Boot", "Sandal", "Rain boot", "Sneaker", "Boot 100%"] {
            repo.insert(&draft(title), &[]).await.unwrap();
        }

        let filter = ListFilter {
            keyword: Some("boot".into()),
            limit: 4,
            offset: 0,
        };
        let titles: Vec<_> = repo
            .find(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, ["Hiking Boot", "Rain boot", "Boot 100%"]);

        let literal_percent = ListFilter {
            keyword: Some("%".into()),
            limit: 4,
            offset: 0,
        };
        assert_eq!(repo.find(&literal_percent).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        let product = repo.insert(&draft("Boot"), &gallery(1)).await.unwrap();

        let removed = repo.delete(&product.id).await.unwrap().unwrap();
        assert_eq!(removed.images, gallery(1));
        assert!(repo.delete(&product.id).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
