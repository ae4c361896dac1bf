//! Product endpoints.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use souq_core::{NewProduct, PageQuery, Product, ProductDetails, ProductPatch, ValidationError};

use crate::auth::{CurrentUser, CATALOG_EDITORS};
use crate::error::{ApiError, ApiResult};
use crate::multipart::FormData;
use crate::state::SharedState;

/// One page of products, each with its category populated.
pub async fn list(
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<ProductDetails>>> {
    Ok(Json(state.products.list_details(&query).await?))
}

/// Returns the product with its category populated.
pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductDetails>> {
    Ok(Json(state.products.get_details(&id).await?))
}

/// Multipart fields: `title`, `description`, `priceCents`, optional
/// `categoryId`, `rate`, `numberOfSales`; one to five image parts.
pub async fn create(
    State(state): State<SharedState>,
    user: CurrentUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Product>)> {
    user.require(CATALOG_EDITORS)?;
    let form = FormData::read(multipart).await?;

    let draft = NewProduct {
        title: form.text_or_empty("title"),
        description: form.text_or_empty("description"),
        price_cents: form.parsed("priceCents")?.ok_or_else(|| {
            ApiError::validation(ValidationError::required("priceCents").to_string())
        })?,
        category_id: form.text("categoryId").filter(|id| !id.trim().is_empty()),
        rate: form.parsed("rate")?,
        number_of_sales: form.parsed("numberOfSales")?,
    };

    let product = state.products.create(draft, &form.files).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Any subset of `title`, `description`, `priceCents`. Image parts replace
/// the whole gallery.
pub async fn update(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Product>> {
    user.require(CATALOG_EDITORS)?;
    let form = FormData::read(multipart).await?;

    let patch = ProductPatch {
        title: form.text("title"),
        description: form.text("description"),
        price_cents: form.parsed("priceCents")?,
    };

    let product = state
        .products
        .update(&id, patch, form.files_if_any())
        .await?;
    Ok(Json(product))
}

pub async fn remove(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    user.require(CATALOG_EDITORS)?;
    Ok(Json(state.products.remove(&id).await?))
}
