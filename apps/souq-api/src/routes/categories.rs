//! Category endpoints.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use souq_core::{Category, CategoryPatch, NewCategory, PageQuery};

use crate::auth::{CurrentUser, CATALOG_EDITORS};
use crate::error::ApiResult;
use crate::multipart::FormData;
use crate::state::SharedState;

pub async fn list(
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.categories.list(&query).await?))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.categories.get(&id).await?))
}

/// Multipart fields: `name`, `description`, one image part.
pub async fn create(
    State(state): State<SharedState>,
    user: CurrentUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Category>)> {
    user.require(CATALOG_EDITORS)?;
    let form = FormData::read(multipart).await?;

    let draft = NewCategory {
        name: form.text_or_empty("name"),
        description: form.text_or_empty("description"),
    };

    let category = state.categories.create(draft, &form.files).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Any subset of `name`, `description`; an image part replaces the image.
pub async fn update(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Category>> {
    user.require(CATALOG_EDITORS)?;
    let form = FormData::read(multipart).await?;

    let patch = CategoryPatch {
        name: form.text("name"),
        description: form.text("description"),
    };

    let category = state
        .categories
        .update(&id, patch, form.files_if_any())
        .await?;
    Ok(Json(category))
}

pub async fn remove(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    user.require(CATALOG_EDITORS)?;
    Ok(Json(state.categories.remove(&id).await?))
}
