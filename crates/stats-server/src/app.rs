//! Application wiring.

use crate::shutdown::{shutdown_signal, ShutdownCoordinator, ShutdownOutcome};
use stats_cache::CacheManager;
use stats_config::AppConfig;
use stats_core::{StatsError, StatsResult};
use stats_rest::{create_router, AppState};
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Binds the configured address and serves until a termination signal.
pub async fn run(config: AppConfig) -> StatsResult<ShutdownOutcome> {
    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| StatsError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    info!("github-readme-stats server running on {}", addr);

    let cache = CacheManager::from_config(&config.cache);
    Ok(serve(listener, &config, cache, shutdown_signal()).await)
}

/// Serves on `listener` until `signal` fires, then shuts down.
///
/// The first cache connection attempt starts in the background right away,
/// so the first request does not pay for it.
pub async fn serve<S>(
    listener: TcpListener,
    config: &AppConfig,
    cache: CacheManager,
    signal: S,
) -> ShutdownOutcome
where
    S: Future<Output = ()>,
{
    if let Some(target) = cache.target() {
        info!("Connecting to cache at {}", target);
        let warm = cache.clone();
        tokio::spawn(async move {
            warm.acquire().await;
        });
    }

    let state = AppState::new(cache.clone(), config.probe.cache_timeout());
    let router = create_router(state, &config.server);

    let coordinator = ShutdownCoordinator::from_config(&config.shutdown);
    let stop = coordinator.token();
    let server = axum::serve(listener, router).with_graceful_shutdown(stop.cancelled_owned());

    coordinator
        .drive(signal, async move { server.await }, &cache)
        .await
}
