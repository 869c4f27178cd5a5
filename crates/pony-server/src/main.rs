//! Dancing Pony server entry point.

use std::net::SocketAddr;
use std::time::Duration;

use pony_db::DbManager;
use pony_server::{AppState, RestaurantWritePolicy, ServerConfig, build_router};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pony=info".parse()?))
        .json()
        .init();

    let config = config.inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    info!("Starting Dancing Pony server...");

    let db = DbManager::connect(&config.db).await?;
    pony_db::run_migrations(db.client()).await?;

    if config.restaurant_write_policy == RestaurantWritePolicy::Open {
        warn!("Restaurant writes are unauthenticated (RESTAURANT_WRITE_POLICY=open)");
    }

    let state = AppState::new(db.client().clone(), &config);
    spawn_limiter_purge(&state, config.rate_limit_window);

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Dancing Pony server stopped.");
    Ok(())
}

/// Periodically drop rate-limit keys with no live timestamps.
fn spawn_limiter_purge(state: &AppState, window: Duration) {
    let limiters = [state.ip_limiter.clone(), state.user_limiter.clone()];
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(window.max(Duration::from_secs(1)));
        loop {
            ticker.tick().await;
            let purged: usize = limiters.iter().map(|l| l.purge_stale()).sum();
            if purged > 0 {
                debug!(purged, "Purged idle rate-limit keys");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
