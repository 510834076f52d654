pub mod refresh_token;
pub mod user;

pub use refresh_token::RefreshToken;
pub use user::{Role, User, UserResponse, UserSummary};
