//! Authentication handlers: register, login, refresh and logout.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{LoginRequest, MessageResponse, RefreshRequest, RegisterRequest},
    middleware::AuthUser,
    utils::ValidatedJson,
    AppState,
};

/// Register a new account. Returns a token pair for the fresh session.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pair = state
        .sessions
        .register(&payload.email, &payload.name, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(pair)))
}

/// Authenticate with email and password.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pair = state
        .sessions
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(pair))
}

/// Exchange a single-use refresh token for a new token pair.
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pair = state
        .sessions
        .refresh(payload.user_id, &payload.refresh_token)
        .await?;

    Ok(Json(pair))
}

/// Revoke every refresh token belonging to the authenticated user.
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.subject()?;
    state.sessions.logout(user_id).await?;

    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}
