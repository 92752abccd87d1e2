//! API Server Entry Point
//!
//! Uses `anyhow` for startup errors; request-level errors go through
//! `kernel::error::AppError`.

use std::net::SocketAddr;
use std::sync::Arc;

use auth::application::RegisterUseCase;
use auth::{AuthConfig, PgUserRepository};
use jasaweb_api::{PgAppParts, build_router};
use platform::config::AppConfig;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "jasaweb_api=info,auth=info,cms=info,billing=info,portal=info,admin=info,tower_http=info"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    if let Some(bootstrap) = &config.admin_bootstrap {
        let use_case = RegisterUseCase::new(Arc::new(PgUserRepository::new(pool.clone())));
        match use_case
            .ensure_admin(&bootstrap.email, bootstrap.password.clone())
            .await
        {
            Ok(admin) => tracing::info!(user_id = %admin.id, "Bootstrap admin ready"),
            // Failing here should not stop the server
            Err(e) => tracing::warn!(error = %e, "Bootstrap admin could not be created"),
        }
    }

    let auth_config = Arc::new(AuthConfig::from_app_config(&config));
    let app = build_router(PgAppParts::postgres(
        pool,
        auth_config,
        config.rate_limit.clone(),
        config.trusted_proxies.clone(),
        config.frontend_origins.clone(),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
