//! # User Repository
//!
//! Database operations for accounts. Roles are stored as a JSON array of
//! lowercase role names. Password hashing happens above this layer; the
//! repository only ever sees the PHC string.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use souq_core::{ListFilter, Role, User};

use super::{from_document, generate_id, like_pattern, to_document};
use crate::error::{DbError, DbResult};

/// Row shape of the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    roles: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = DbError;

    fn try_from(record: UserRecord) -> DbResult<Self> {
        Ok(User {
            roles: from_document(&record.roles)?,
            id: record.id,
            name: record.name,
            email: record.email,
            password_hash: record.password_hash,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Column changes for [`UserRepository::update`].
///
/// Unlike `UserPatch`, the password is already hashed.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub roles: Option<Vec<Role>>,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts an account.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - the email is already registered
    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        roles: &[Role],
    ) -> DbResult<User> {
        let id = generate_id();
        let now = Utc::now();
        let roles = to_document(roles)?;

        debug!(id = %id, email = %email, "Inserting user");

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, name, email, password_hash, roles, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING id, name, email, password_hash, roles, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(roles)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match DbError::from(err) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, email),
            other => other,
        })?;

        record.try_into()
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, roles, created_at, updated_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(User::try_from).transpose()
    }

    /// Gets a user by email address.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, roles, created_at, updated_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        record.map(User::try_from).transpose()
    }

    /// Lists users, optionally matching the keyword against name or email.
    pub async fn find(&self, filter: &ListFilter) -> DbResult<Vec<User>> {
        let pattern = filter.keyword.as_deref().map(like_pattern);

        let records = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, roles, created_at, updated_at
            FROM users
            WHERE ?1 IS NULL
               OR name LIKE ?1 ESCAPE '\'
               OR email LIKE ?1 ESCAPE '\'
            ORDER BY rowid
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(pattern)
        .bind(i64::from(filter.limit))
        .bind(i64::from(filter.offset))
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(User::try_from).collect()
    }

    /// Applies column changes. `None` fields keep their stored value.
    pub async fn update(&self, id: &str, changes: &UserChanges) -> DbResult<Option<User>> {
        let roles = changes.roles.as_deref().map(to_document).transpose()?;

        debug!(id = %id, "Updating user");

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
            SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email),
                password_hash = COALESCE(?4, password_hash),
                roles = COALESCE(?5, roles),
                updated_at = ?6
            WHERE id = ?1
            RETURNING id, name, email, password_hash, roles, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.password_hash.as_deref())
        .bind(roles)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| match DbError::from(err) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, changes.email.as_deref().unwrap_or_default())
            }
            other => other,
        })?;

        record.map(User::try_from).transpose()
    }

    /// Deletes a user (and, through the foreign key, their orders).
    pub async fn delete(&self, id: &str) -> DbResult<Option<User>> {
        debug!(id = %id, "Deleting user");

        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            DELETE FROM users
            WHERE id = ?1
            RETURNING id, name, email, password_hash, roles, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(User::try_from).transpose()
    }

    /// Counts users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
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

    async fn repo() -> UserRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().users()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let repo = repo().await;
        let user = repo
            .insert("Dana", "dana@example.com", "$argon2id$hash", &[Role::Admin])
            .await
            .unwrap();

        assert_eq!(user.roles, vec![Role::Admin]);
        assert_eq!(user.password_hash, "$argon2id$hash");

        let by_email = repo.get_by_email("dana@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = repo().await;
        repo.insert("Dana", "dana@example.com", "h", &[Role::User])
            .await
            .unwrap();

        let err = repo
            .insert("Other", "dana@example.com", "h", &[Role::User])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn test_update_changes() {
        let repo = repo().await;
        let user = repo
            .insert("Dana", "dana@example.com", "old", &[Role::User])
            .await
            .unwrap();

        let changes = UserChanges {
            password_hash: Some("new".into()),
            roles: Some(vec![Role::User, Role::Moderator]),
            ..Default::default()
        };
        let updated = repo.update(&user.id, &changes).await.unwrap().unwrap();

        assert_eq!(updated.name, "Dana");
        assert_eq!(updated.password_hash, "new");
        assert_eq!(updated.roles, vec![Role::User, Role::Moderator]);
        assert!(repo
            .update("missing", &UserChanges::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_and_delete() {
        let repo = repo().await;
        repo.insert("Dana", "dana@example.com", "h", &[Role::User])
            .await
            .unwrap();
        let sam = repo
            .insert("Sam", "sam@shop.test", "h", &[Role::User])
            .await
            .unwrap();

        let filter = ListFilter {
            keyword: Some("shop".into()),
            limit: 10,
            offset: 0,
        };
        let found = repo.find(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, sam.id);

        assert!(repo.delete(&sam.id).await.unwrap().is_some());
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
