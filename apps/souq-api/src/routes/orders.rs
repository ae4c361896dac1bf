//! Order endpoints. All of them require a signed-in caller.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use souq_core::{NewOrder, Order, OrderPatch, OrderStatus, PageQuery};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<u32>,
    pub status: Option<String>,
}

impl OrderListQuery {
    fn status(&self) -> ApiResult<Option<OrderStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e: souq_core::ValidationError| ApiError::validation(e.to_string())),
        }
    }
}

pub async fn list(
    State(state): State<SharedState>,
    _user: CurrentUser,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let status = query.status()?;
    let page = PageQuery::new(query.page, None);
    Ok(Json(state.orders.list(&page, status).await?))
}

pub async fn create(
    State(state): State<SharedState>,
    _user: CurrentUser,
    Json(draft): Json<NewOrder>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state.orders.create(draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_by_user(
    State(state): State<SharedState>,
    _user: CurrentUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list_by_user(&user_id).await?))
}

pub async fn get(
    State(state): State<SharedState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.orders.get(&id).await?))
}

pub async fn update(
    State(state): State<SharedState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.orders.update(&id, patch).await?))
}

pub async fn delete(
    State(state): State<SharedState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    Ok(Json(state.orders.delete(&id).await?))
}
