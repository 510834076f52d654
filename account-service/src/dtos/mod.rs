//! Data transfer objects for the HTTP API.

mod auth;

pub use auth::{LoginRequest, RefreshRequest, RegisterRequest, TokenPair};

use serde::{Deserialize, Serialize};

/// Generic error payload returned by handlers and extractors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Generic message payload for endpoints with no body to return.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
