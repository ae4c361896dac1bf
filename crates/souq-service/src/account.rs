//! # Account Service
//!
//! Signup, login, token authentication and user administration.
//!
//! ```text
//! signup(name, email, password, roles?)
//!     validate → email free? → argon2 hash → insert → JWT(sub = user id)
//! login(email, password)
//!     lookup by email → verify hash → JWT
//!     (unknown email and wrong password give the same error)
//! authenticate(token)
//!     verify JWT → load user by sub → User with current roles
//! ```
//!
//! Emails are stored trimmed and lowercased.

use serde::Serialize;
use tracing::{debug, info};

use souq_core::validation::{validate_new_user, validate_user_patch, validate_uuid};
use souq_core::{Credentials, NewUser, PageQuery, Role, User, UserPatch, ValidationError};
use souq_db::{Database, UserChanges};

use crate::auth::{hash_password, verify_password, JwtManager};
use crate::error::{ServiceError, ServiceResult};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Token returned by signup and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthToken {
    pub token: String,
}

#[derive(Clone)]
pub struct AccountService {
    db: Database,
    jwt: JwtManager,
    page_size: u32,
}

impl AccountService {
    pub fn new(db: Database, jwt: JwtManager, page_size: u32) -> Self {
        AccountService { db, jwt, page_size }
    }

    /// Registers an account and returns a token for it.
    pub async fn signup(&self, draft: NewUser) -> ServiceResult<AuthToken> {
        validate_new_user(&draft)?;
        let email = normalize_email(&draft.email);

        if self.db.users().get_by_email(&email).await?.is_some() {
            return Err(ValidationError::duplicate("email", email).into());
        }

        let roles = match draft.roles {
            Some(roles) if !roles.is_empty() => roles,
            _ => vec![Role::User],
        };
        let password_hash = hash_password(&draft.password)?;

        let user = self
            .db
            .users()
            .insert(draft.name.trim(), &email, &password_hash, &roles)
            .await?;

        info!(id = %user.id, roles = ?user.roles, "User signed up");
        self.token_for(&user)
    }

    /// Exchanges credentials for a token.
    pub async fn login(&self, credentials: Credentials) -> ServiceResult<AuthToken> {
        let email = normalize_email(&credentials.email);

        let user = self
            .db
            .users()
            .get_by_email(&email)
            .await?
            .filter(|user| verify_password(&credentials.password, &user.password_hash))
            .ok_or_else(|| ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        debug!(id = %user.id, "User logged in");
        self.token_for(&user)
    }

    /// Resolves a bearer token to the current user record.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<User> {
        let claims = self.jwt.validate(token)?;

        self.db
            .users()
            .get_by_id(&claims.sub)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("account no longer exists".to_string()))
    }

    pub async fn list(&self, query: &PageQuery) -> ServiceResult<Vec<User>> {
        let filter = query.to_filter(self.page_size)?;
        Ok(self.db.users().find(&filter).await?)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<User> {
        validate_uuid(id)?;
        self.db
            .users()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    /// Updates an account. A new email must be free; a new password is
    /// re-hashed.
    pub async fn update(&self, id: &str, patch: UserPatch) -> ServiceResult<User> {
        validate_uuid(id)?;
        validate_user_patch(&patch)?;

        // NotFound takes precedence over a clashing email.
        self.get(id).await?;

        let email = patch.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            if let Some(other) = self.db.users().get_by_email(email).await? {
                if other.id != id {
                    return Err(ValidationError::duplicate("email", email).into());
                }
            }
        }

        let changes = UserChanges {
            name: patch.name.as_deref().map(|name| name.trim().to_string()),
            email,
            password_hash: patch.password.as_deref().map(hash_password).transpose()?,
            roles: patch.roles,
        };

        let user = self
            .db
            .users()
            .update(id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        info!(id = %id, "User updated");
        Ok(user)
    }

    /// Deletes an account along with its orders.
    pub async fn delete(&self, id: &str) -> ServiceResult<User> {
        validate_uuid(id)?;
        let user = self
            .db
            .users()
            .delete(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        info!(id = %id, "User deleted");
        Ok(user)
    }

    fn token_for(&self, user: &User) -> ServiceResult<AuthToken> {
        Ok(AuthToken {
            token: self.jwt.issue(&user.id)?,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
