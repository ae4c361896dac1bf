//! Bearer-token extractor and role guard.
//!
//! ```text
//! Authorization: Bearer <jwt>
//!        │
//!        ▼
//! AccountService::authenticate(token) → User (roles re-read from the db)
//!        │
//!        ▼
//! CurrentUser::require(&[Role::Admin]) → Ok | 403
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use souq_core::{Role, User};
use souq_service::auth::extract_bearer_token;

use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

/// Roles allowed to change the catalog.
pub const CATALOG_EDITORS: &[Role] = &[Role::Moderator, Role::Admin];

/// Roles allowed to administer accounts.
pub const ADMINS: &[Role] = &[Role::Admin];

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Fails with 403 unless the caller holds one of `roles`.
    pub fn require(&self, roles: &[Role]) -> ApiResult<()> {
        if self.0.has_any_role(roles) {
            Ok(())
        } else {
            debug!(user_id = %self.0.id, required = ?roles, "Role check failed");
            Err(ApiError::forbidden())
        }
    }
}

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("expected a bearer token"))?;

        let user = state.accounts.authenticate(token).await?;
        Ok(CurrentUser(user))
    }
}
