//! Refresh token model - one row per issued refresh credential.
//!
//! Only the bcrypt hash of the secret is stored; the plaintext secret is
//! returned to the caller once at issuance and never persisted.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    /// None means no expiry is enforced for this row.
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn new(user_id: Uuid, token_hash: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            expires_at,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= Utc::now())
    }
}
