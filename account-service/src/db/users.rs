//! Credential store: persistence contract for user records.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{models::User, services::ServiceError};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user. Fails with `DuplicateEmail` when the email is
    /// already on file.
    async fn insert(&self, user: &User) -> Result<(), ServiceError>;

    /// Look up a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError>;

    /// Delete a user. Refresh tokens cascade at the schema level.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;

    async fn health_check(&self) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> Result<(), ServiceError> {
        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, password_hash, role, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, password_hash, role, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Map the Postgres unique-violation code onto the domain error.
fn map_unique_violation(err: sqlx::Error) -> ServiceError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return ServiceError::DuplicateEmail;
        }
    }
    ServiceError::Database(err)
}
