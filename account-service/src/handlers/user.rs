use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{dtos::MessageResponse, middleware::AuthUser, AppState};

/// Current user's profile, without sensitive fields.
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.subject()?;
    let user = state.sessions.get_user(user_id).await?;

    Ok(Json(user.sanitized()))
}

/// Delete the authenticated user's account. All of their refresh tokens
/// go with it.
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.subject()?;
    state.sessions.delete_account(user_id).await?;

    Ok(Json(MessageResponse {
        message: "Account deleted".to_string(),
    }))
}
