//! Refresh token store: one row per issued refresh credential.
//!
//! Rotation and expiry decisions live in the session service; this layer
//! is a thin persistence boundary.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{models::RefreshToken, services::ServiceError};

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create(&self, token: &RefreshToken) -> Result<(), ServiceError>;

    /// All stored rows for a user, i.e. their currently valid, unused
    /// refresh credentials.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, ServiceError>;

    /// Delete a single row, reporting whether this call removed it.
    ///
    /// This is the atomic consume step of rotation: when two requests
    /// present the same secret, at most one caller observes `true`.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ServiceError>;

    /// Bulk delete for logout. Returns the number of rows removed.
    async fn delete_by_user(&self, user_id: Uuid) -> Result<u64, ServiceError>;
}

#[derive(Clone)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn create(&self, token: &RefreshToken) -> Result<(), ServiceError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>, ServiceError> {
        let tokens = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token_hash, expires_at, created_at
             FROM refresh_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ServiceError> {
        // A single conditional DELETE; the affected count tells the caller
        // whether it won the consume race.
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
