//! Signup, login and user administration.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use souq_core::{Credentials, NewUser, PageQuery, User, UserPatch};
use souq_service::AuthToken;

use crate::auth::{CurrentUser, ADMINS};
use crate::error::ApiResult;
use crate::state::SharedState;

pub async fn signup(
    State(state): State<SharedState>,
    Json(draft): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<AuthToken>)> {
    let token = state.accounts.signup(draft).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(credentials): Json<Credentials>,
) -> ApiResult<Json<AuthToken>> {
    Ok(Json(state.accounts.login(credentials).await?))
}

pub async fn list(
    State(state): State<SharedState>,
    user: CurrentUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<User>>> {
    user.require(ADMINS)?;
    Ok(Json(state.accounts.list(&query).await?))
}

pub async fn get(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    user.require(ADMINS)?;
    Ok(Json(state.accounts.get(&id).await?))
}

pub async fn update(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> ApiResult<Json<User>> {
    user.require(ADMINS)?;
    Ok(Json(state.accounts.update(&id, patch).await?))
}

pub async fn delete(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    user.require(ADMINS)?;
    Ok(Json(state.accounts.delete(&id).await?))
}
