//! Shared setup for integration tests. Everything runs against the
//! in-memory stores, no external services required.

use std::sync::Arc;

use account_service::{
    config::{
        AppConfig, DatabaseConfig, Environment, JwtConfig, RateLimitConfig, SecurityConfig,
    },
    db::{InMemoryRefreshTokenStore, InMemoryUserStore, RefreshTokenStore, UserStore},
    services::{JwtService, SessionService},
    AppState,
};
use service_core::middleware::create_ip_rate_limiter;

// Minimum bcrypt cost keeps the tests fast
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Dev,
        service_name: "account-service".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        port: 8080,
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
            bcrypt_cost: TEST_BCRYPT_COST,
        },
        rate_limit: RateLimitConfig {
            login_attempts: 1000,
            login_window_seconds: 60,
            register_attempts: 1000,
            register_window_seconds: 60,
            global_ip_limit: 1000,
            global_ip_window_seconds: 60,
        },
    }
}

pub struct TestEnv {
    pub state: AppState,
    pub sessions: SessionService,
    pub users: Arc<InMemoryUserStore>,
    pub refresh_tokens: Arc<InMemoryRefreshTokenStore>,
}

pub fn test_env() -> TestEnv {
    let config = test_config();

    let users = Arc::new(InMemoryUserStore::new());
    let refresh_tokens = Arc::new(InMemoryRefreshTokenStore::new());

    let users_dyn: Arc<dyn UserStore> = users.clone();
    let tokens_dyn: Arc<dyn RefreshTokenStore> = refresh_tokens.clone();

    let jwt = JwtService::new(&config.jwt);
    let sessions = SessionService::new(
        users_dyn.clone(),
        tokens_dyn,
        jwt.clone(),
        config.security.bcrypt_cost,
        config.jwt.refresh_token_expiry_days,
    );

    let state = AppState {
        config: config.clone(),
        users: users_dyn,
        jwt,
        sessions: sessions.clone(),
        login_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.login_attempts,
            config.rate_limit.login_window_seconds,
        ),
        register_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.register_attempts,
            config.rate_limit.register_window_seconds,
        ),
        ip_rate_limiter: create_ip_rate_limiter(
            config.rate_limit.global_ip_limit,
            config.rate_limit.global_ip_window_seconds,
        ),
    };

    TestEnv {
        state,
        sessions,
        users,
        refresh_tokens,
    }
}
