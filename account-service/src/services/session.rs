//! Session service: registration, login, refresh rotation and logout.
//!
//! Refresh tokens are opaque random secrets. The service stores only a
//! bcrypt hash of each secret, so presented secrets are matched by
//! verifying against every stored row for the user. A matched row is
//! consumed (deleted) before the replacement pair is issued, which makes
//! every refresh token single-use.

use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{RefreshTokenStore, UserStore},
    dtos::TokenPair,
    models::{RefreshToken, User, UserSummary},
    services::{JwtService, ServiceError},
    utils::{hash_password, verify_password, Password, PasswordHashString},
};

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    jwt: JwtService,
    bcrypt_cost: u32,
    refresh_token_expiry_days: i64,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        jwt: JwtService,
        bcrypt_cost: u32,
        refresh_token_expiry_days: i64,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            jwt,
            bcrypt_cost,
            refresh_token_expiry_days,
        }
    }

    /// Register a new account and start its first session.
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<TokenPair, ServiceError> {
        let email = normalize_email(email);

        let password = Password::new(password.to_string());
        let password_hash = hash_password(&password, self.bcrypt_cost).await?;

        let user = User::new(email, name.trim().to_string(), password_hash.into_string());
        self.users.insert(&user).await?;

        tracing::info!(user_id = %user.id, "User registered");

        self.issue_token_pair(&user).await
    }

    /// Authenticate by email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ServiceError> {
        let email = normalize_email(email);

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let password = Password::new(password.to_string());
        let stored = PasswordHashString::new(user.password_hash.clone());
        let matched = verify_password(&password, &stored).await?;
        if !matched {
            return Err(ServiceError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");

        self.issue_token_pair(&user).await
    }

    /// Rotate a refresh token: consume the presented secret, then issue a
    /// fresh pair.
    pub async fn refresh(
        &self,
        user_id: Uuid,
        refresh_token: &str,
    ) -> Result<TokenPair, ServiceError> {
        let stored = self.refresh_tokens.find_by_user(user_id).await?;

        let presented = Password::new(refresh_token.to_string());
        let mut matched: Option<RefreshToken> = None;
        for row in stored {
            let hash = PasswordHashString::new(row.token_hash.clone());
            if verify_password(&presented, &hash).await? {
                matched = Some(row);
                break;
            }
        }

        let row = matched.ok_or(ServiceError::InvalidRefreshToken)?;

        if row.is_expired() {
            // Expired rows are purged on sight; a retry then reports the
            // generic invalid-token error.
            self.refresh_tokens.delete_by_id(row.id).await?;
            tracing::warn!(user_id = %user_id, "Expired refresh token presented");
            return Err(ServiceError::RefreshTokenExpired);
        }

        // The delete is the consume step. When two requests race on the
        // same secret, only the one that removed the row proceeds.
        let consumed = self.refresh_tokens.delete_by_id(row.id).await?;
        if !consumed {
            return Err(ServiceError::InvalidRefreshToken);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::InvalidRefreshToken)?;

        tracing::debug!(user_id = %user.id, "Refresh token rotated");

        self.issue_token_pair(&user).await
    }

    /// End all sessions for a user by revoking every stored refresh token.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let revoked = self.refresh_tokens.delete_by_user(user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "User logged out");
        Ok(())
    }

    /// Delete the account and revoke every session it owns.
    ///
    /// Postgres cascades the token rows through the FK; the explicit
    /// revoke keeps other store implementations to the same contract.
    pub async fn delete_account(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let revoked = self.refresh_tokens.delete_by_user(user_id).await?;
        let deleted = self.users.delete(user_id).await?;
        if !deleted {
            return Err(ServiceError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, revoked, "Account deleted");
        Ok(())
    }

    /// Fetch a user's profile.
    pub async fn get_user(&self, user_id: Uuid) -> Result<User, ServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    /// Sign an access token and mint a stored refresh credential.
    async fn issue_token_pair(&self, user: &User) -> Result<TokenPair, ServiceError> {
        let access_token = self.jwt.generate_access_token(user)?;

        let secret = generate_refresh_secret();
        let secret_hash = hash_password(&Password::new(secret.clone()), self.bcrypt_cost).await?;

        let expires_at = Utc::now() + Duration::days(self.refresh_token_expiry_days);
        let token = RefreshToken::new(user.id, secret_hash.into_string(), Some(expires_at));
        self.refresh_tokens.create(&token).await?;

        Ok(TokenPair {
            access_token,
            refresh_token: secret,
            expires_at,
            user: UserSummary::from(user),
        })
    }
}

/// 32 random bytes, hex encoded. Short enough that bcrypt hashes the
/// whole value without truncation.
fn generate_refresh_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}
