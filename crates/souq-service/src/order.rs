//! Order service.
//!
//! Orders own no assets, so this is plain validated CRUD over
//! [`OrderRepository`](souq_db::OrderRepository).

use tracing::info;

use souq_core::validation::{validate_new_order, validate_order_patch, validate_uuid};
use souq_core::{NewOrder, Order, OrderPatch, OrderStatus, PageQuery};
use souq_db::Database;

use crate::error::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct OrderService {
    db: Database,
    page_size: u32,
}

impl OrderService {
    pub fn new(db: Database, page_size: u32) -> Self {
        OrderService { db, page_size }
    }

    /// Places an order for an existing user.
    pub async fn create(&self, draft: NewOrder) -> ServiceResult<Order> {
        validate_new_order(&draft)?;
        self.ensure_user(&draft.user_id).await?;

        let order = self.db.orders().insert(&draft).await?;
        info!(id = %order.id, user_id = %order.user_id, total = order.total_price_cents, "Order placed");
        Ok(order)
    }

    /// One page of orders, optionally restricted to a status.
    pub async fn list(
        &self,
        query: &PageQuery,
        status: Option<OrderStatus>,
    ) -> ServiceResult<Vec<Order>> {
        let filter = query.to_filter(self.page_size)?;
        Ok(self.db.orders().find(&filter, status).await?)
    }

    /// Every order placed by a user.
    pub async fn list_by_user(&self, user_id: &str) -> ServiceResult<Vec<Order>> {
        validate_uuid(user_id)?;
        Ok(self.db.orders().find_by_user(user_id).await?)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Order> {
        validate_uuid(id)?;
        self.db
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))
    }

    pub async fn update(&self, id: &str, patch: OrderPatch) -> ServiceResult<Order> {
        validate_uuid(id)?;
        validate_order_patch(&patch)?;
        if let Some(user_id) = &patch.user_id {
            self.ensure_user(user_id).await?;
        }

        let order = self
            .db
            .orders()
            .update(id, &patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))?;

        info!(id = %id, status = %order.status, "Order updated");
        Ok(order)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<Order> {
        validate_uuid(id)?;
        let order = self
            .db
            .orders()
            .delete(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))?;

        info!(id = %id, "Order deleted");
        Ok(order)
    }

    async fn ensure_user(&self, user_id: &str) -> ServiceResult<()> {
        match self.db.users().get_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found("User", user_id)),
        }
    }
}
