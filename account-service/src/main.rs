use account_service::{
    build_router,
    config::AppConfig,
    db::{PgRefreshTokenStore, PgUserStore},
    services::{JwtService, SessionService},
    AppState,
};
use service_core::middleware::create_ip_rate_limiter;
use service_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = AppConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting account service"
    );

    let pool = account_service::db::create_pool(&config.database).await?;
    account_service::db::run_migrations(&pool)
        .await
        .map_err(|e| {
            service_core::error::AppError::InternalError(anyhow::anyhow!(
                "Migration failed: {}",
                e
            ))
        })?;

    let users: Arc<dyn account_service::db::UserStore> = Arc::new(PgUserStore::new(pool.clone()));
    let refresh_tokens: Arc<dyn account_service::db::RefreshTokenStore> =
        Arc::new(PgRefreshTokenStore::new(pool));

    let jwt = JwtService::new(&config.jwt);
    let sessions = SessionService::new(
        users.clone(),
        refresh_tokens,
        jwt.clone(),
        config.security.bcrypt_cost,
        config.jwt.refresh_token_expiry_days,
    );

    let login_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.login_attempts,
        config.rate_limit.login_window_seconds,
    );
    let register_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.register_attempts,
        config.rate_limit.register_window_seconds,
    );
    let ip_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.global_ip_limit,
        config.rate_limit.global_ip_window_seconds,
    );
    tracing::info!("Rate limiters initialized: Login, Register, and Global IP");

    let port = config.port;
    let state = AppState {
        config,
        users,
        jwt,
        sessions,
        login_rate_limiter,
        register_rate_limiter,
        ip_rate_limiter,
    };

    let app = build_router(state)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
