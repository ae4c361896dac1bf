//! # Order Repository
//!
//! Database operations for orders. Order lines live in a JSON document
//! column (`orders.items`); the status is a lowercase text column.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use souq_core::{ListFilter, NewOrder, Order, OrderPatch, OrderStatus};

use super::{from_document, generate_id, to_document};
use crate::error::{DbError, DbResult};

/// Row shape of the `orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRecord {
    id: String,
    user_id: String,
    items: String,
    total_price_cents: i64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = DbError;

    fn try_from(record: OrderRecord) -> DbResult<Self> {
        Ok(Order {
            items: from_document(&record.items)?,
            id: record.id,
            user_id: record.user_id,
            total_price_cents: record.total_price_cents,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order. Status defaults to `pending`.
    ///
    /// ## Errors
    /// * `DbError::ForeignKeyViolation` - the user does not exist
    pub async fn insert(&self, draft: &NewOrder) -> DbResult<Order> {
        let id = generate_id();
        let now = Utc::now();
        let items = to_document(&draft.items)?;

        debug!(id = %id, user_id = %draft.user_id, lines = draft.items.len(), "Inserting order");

        let record = sqlx::query_as::<_, OrderRecord>(
            r#"
            INSERT INTO orders (id, user_id, items, total_price_cents, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING id, user_id, items, total_price_cents, status, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(&draft.user_id)
        .bind(items)
        .bind(draft.total_price_cents)
        .bind(draft.status.unwrap_or_default())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        record.try_into()
    }

    /// Gets an order by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, user_id, items, total_price_cents, status, created_at, updated_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Order::try_from).transpose()
    }

    /// Lists orders in insertion order, optionally restricted to one status.
    ///
    /// The filter's keyword is not used for orders.
    pub async fn find(
        &self,
        filter: &ListFilter,
        status: Option<OrderStatus>,
    ) -> DbResult<Vec<Order>> {
        debug!(status = ?status, limit = filter.limit, offset = filter.offset, "Listing orders");

        let records = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, user_id, items, total_price_cents, status, created_at, updated_at
            FROM orders
            WHERE ?1 IS NULL OR status = ?1
            ORDER BY rowid
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(status)
        .bind(i64::from(filter.limit))
        .bind(i64::from(filter.offset))
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(Order::try_from).collect()
    }

    /// Lists every order placed by a user, oldest first.
    pub async fn find_by_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT id, user_id, items, total_price_cents, status, created_at, updated_at
            FROM orders
            WHERE user_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(Order::try_from).collect()
    }

    /// Applies a partial update. `None` fields keep their stored value.
    ///
    /// ## Returns
    /// * `Ok(Some(Order))` - the updated record
    /// * `Ok(None)` - no order with that ID
    pub async fn update(&self, id: &str, patch: &OrderPatch) -> DbResult<Option<Order>> {
        let items = patch.items.as_ref().map(to_document).transpose()?;

        debug!(id = %id, status = ?patch.status, "Updating order");

        let record = sqlx::query_as::<_, OrderRecord>(
            r#"
            UPDATE orders
            SET
                user_id = COALESCE(?2, user_id),
                items = COALESCE(?3, items),
                total_price_cents = COALESCE(?4, total_price_cents),
                status = COALESCE(?5, status),
                updated_at = ?6
            WHERE id = ?1
            RETURNING id, user_id, items, total_price_cents, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.user_id.as_deref())
        .bind(items)
        .bind(patch.total_price_cents)
        .bind(patch.status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        record.map(Order::try_from).transpose()
    }

    /// Deletes an order and returns the removed record.
    pub async fn delete(&self, id: &str) -> DbResult<Option<Order>> {
        debug!(id = %id, "Deleting order");

        let record = sqlx::query_as::<_, OrderRecord>(
            r#"
            DELETE FROM orders
            WHERE id = ?1
            RETURNING id, user_id, items, total_price_cents, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Order::try_from).transpose()
    }

    /// Counts orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
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
    use souq_core::{OrderItem, Role};

    async fn setup() -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db
            .users()
            .insert("Dana", "dana@example.com", "$argon2id$hash", &[Role::User])
            .await
            .unwrap();
        (db, user.id)
    }

    fn draft(user_id: &str) -> NewOrder {
        NewOrder {
            user_id: user_id.to_string(),
            items: vec![OrderItem {
                product_id: "3f2c1a9e-8f6b-4b1e-9a7e-2d4f5c6b7a80".into(),
                quantity: 2,
                price_cents: 1500,
            }],
            total_price_cents: 3000,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_insert_defaults_to_pending() {
        let (db, user_id) = setup().await;
        let order = db.orders().insert(&draft(&user_id)).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(db.orders().get_by_id(&order.id).await.unwrap().unwrap(), order);
    }

    #[tokio::test]
    async fn test_unknown_user_rejected() {
        let (db, _) = setup().await;
        let err = db.orders().insert(&draft("ghost")).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_status_filter_and_update() {
        let (db, user_id) = setup().await;
        let repo = db.orders();
        let first = repo.insert(&draft(&user_id)).await.unwrap();
        repo.insert(&draft(&user_id)).await.unwrap();

        let patch = OrderPatch {
            status: Some(OrderStatus::Shipped),
            ..Default::default()
        };
        let shipped = repo.update(&first.id, &patch).await.unwrap().unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
        assert_eq!(shipped.total_price_cents, 3000);

        let only_shipped = repo
            .find(&ListFilter::first(10), Some(OrderStatus::Shipped))
            .await
            .unwrap();
        assert_eq!(only_shipped.len(), 1);
        assert_eq!(only_shipped[0].id, first.id);

        assert_eq!(repo.find(&ListFilter::first(10), None).await.unwrap().len(), 2);
        assert_eq!(repo.find_by_user(&user_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_orders_removed_with_user() {
        let (db, user_id) = setup().await;
        let order = db.orders().insert(&draft(&user_id)).await.unwrap();

        db.users().delete(&user_id).await.unwrap();
        assert!(db.orders().get_by_id(&order.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, user_id) = setup().await;
        let order = db.orders().insert(&draft(&user_id)).await.unwrap();

        assert!(db.orders().delete(&order.id).await.unwrap().is_some());
        assert!(db.orders().delete(&order.id).await.unwrap().is_none());
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }
}
