//! # Category Repository
//!
//! Database operations for categories.
//!
//! The category image is stored as a JSON document in `categories.image`
//! (`NULL` when the category has none).

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use souq_core::{AssetRef, Category, CategoryPatch, ListFilter, NewCategory};

use super::{from_document, generate_id, like_pattern, to_document};
use crate::error::{DbError, DbResult};

/// Row shape of the `categories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CategoryRecord {
    id: String,
    name: String,
    description: String,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CategoryRecord> for Category {
    type Error = DbError;

    fn try_from(record: CategoryRecord) -> DbResult<Self> {
        let image = record.image.as_deref().map(from_document).transpose()?;
        Ok(Category {
            id: record.id,
            name: record.name,
            description: record.description,
            image,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a category and returns the stored record.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - the name is taken
    pub async fn insert(&self, draft: &NewCategory, image: Option<&AssetRef>) -> DbResult<Category> {
        let id = generate_id();
        let now = Utc::now();
        let image = image.map(to_document).transpose()?;

        debug!(id = %id, name = %draft.name, "Inserting category");

        let record = sqlx::query_as::<_, CategoryRecord>(
            r#"
            INSERT INTO categories (id, name, description, image, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING id, name, description, image, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(image)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match DbError::from(err) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &draft.name),
            other => other,
        })?;

        record.try_into()
    }

    /// Gets a category by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT id, name, description, image, created_at, updated_at
            FROM categories
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Category::try_from).transpose()
    }

    /// Gets every category whose id is in `ids`, in one query. Unknown ids
    /// are skipped.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Category>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, name, description, image, created_at, updated_at FROM categories WHERE id IN (",
        );
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");

        let records = query
            .build_query_as::<CategoryRecord>()
            .fetch_all(&self.pool)
            .await?;

        records.into_iter().map(Category::try_from).collect()
    }

    /// Gets a category by its exact name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT id, name, description, image, created_at, updated_at
            FROM categories
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Category::try_from).transpose()
    }

    /// Lists categories in insertion order, optionally filtered by a
    /// case-insensitive substring of the name.
    pub async fn find(&self, filter: &ListFilter) -> DbResult<Vec<Category>> {
        let pattern = filter.keyword.as_deref().map(like_pattern);

        debug!(keyword = ?filter.keyword, limit = filter.limit, offset = filter.offset, "Listing categories");

        let records = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT id, name, description, image, created_at, updated_at
            FROM categories
            WHERE ?1 IS NULL OR name LIKE ?1 ESCAPE '\'
            ORDER BY rowid
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(pattern)
        .bind(i64::from(filter.limit))
        .bind(i64::from(filter.offset))
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(Category::try_from).collect()
    }

    /// Applies a partial update.
    ///
    /// Fields left `None` in `patch` keep their stored value. When `image`
    /// is given it replaces the stored image.
    ///
    /// ## Returns
    /// * `Ok(Some(Category))` - the updated record
    /// * `Ok(None)` - no category with that ID
    pub async fn update(
        &self,
        id: &str,
        patch: &CategoryPatch,
        image: Option<&AssetRef>,
    ) -> DbResult<Option<Category>> {
        let image = image.map(to_document).transpose()?;

        debug!(id = %id, replace_image = image.is_some(), "Updating category");

        let record = sqlx::query_as::<_, CategoryRecord>(
            r#"
            UPDATE categories
            SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                image = COALESCE(?4, image),
                updated_at = ?5
            WHERE id = ?1
            RETURNING id, name, description, image, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(image)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| match DbError::from(err) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, patch.name.as_deref().unwrap_or_default())
            }
            other => other,
        })?;

        record.map(Category::try_from).transpose()
    }

    /// Deletes a category and returns the removed record.
    ///
    /// Products in the category keep existing with no category.
    pub async fn delete(&self, id: &str) -> DbResult<Option<Category>> {
        debug!(id = %id, "Deleting category");

        let record = sqlx::query_as::<_, CategoryRecord>(
            r#"
            DELETE FROM categories
            WHERE id = ?1
            RETURNING id, name, description, image, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Category::try_from).transpose()
    }

    /// Counts categories.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
