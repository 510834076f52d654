//! Services layer: session orchestration, token signing and error types.

pub mod error;
mod jwt;
mod session;

pub use error::ServiceError;
pub use jwt::{AccessTokenClaims, JwtService};
pub use session::{normalize_email, SessionService};
