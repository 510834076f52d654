use service_core::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Email already registered")]
    DuplicateEmail,

    /// Unknown email and wrong password are deliberately the same error
    /// so callers cannot enumerate accounts.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("User not found")]
    UserNotFound,
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(e),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::DuplicateEmail => {
                AppError::Conflict(anyhow::anyhow!("Email already registered"))
            }
            ServiceError::InvalidCredentials => {
                AppError::AuthError(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::InvalidRefreshToken => {
                AppError::AuthError(anyhow::anyhow!("Invalid refresh token"))
            }
            ServiceError::RefreshTokenExpired => {
                AppError::AuthError(anyhow::anyhow!("Refresh token expired"))
            }
            ServiceError::TokenInvalid => AppError::AuthError(anyhow::anyhow!("Invalid token")),
            ServiceError::TokenExpired => AppError::AuthError(anyhow::anyhow!("Token expired")),
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
        }
    }
}
