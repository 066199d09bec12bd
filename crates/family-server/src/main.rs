use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use family_api::auth::{AppState, AppStateInner};
use family_api::token::AuthKeys;
use family_db::{EventStore, UserStore};
use family_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    family_server::init_logging();

    let config = ServerConfig::from_env()?;

    let keys = AuthKeys::from_rsa_pem(
        config.private_key_pem.as_bytes(),
        config.public_key_pem.as_bytes(),
        chrono::Duration::hours(config.token_ttl_hours),
    )
    .context("failed to load RSA keypair")?;

    // Each store owns its own file
    let users = UserStore::open(&config.users_db)?;
    let events = EventStore::open(&config.events_db)?;
    info!("{} registered users", users.count()?);

    let state: AppState = Arc::new(AppStateInner {
        users,
        events,
        keys,
    });

    let app = family_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Family organiser listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::warn!("SIGTERM handler unavailable: {}", e);
                    ctrl_c.await.ok();
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
