use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::tenants::TenantRegistryCache;
use crate::metrics::Metrics;

/// Periodic cleaner for the tenant registry cache.
///
/// Empties the cache at a fixed interval so that tenants deleted from the
/// tenant manager stop being accepted. The first clear happens one full
/// interval after start. Stops on the shutdown broadcast.
pub struct TenantCacheCleaner {
    cache: Arc<TenantRegistryCache>,
    interval: Duration,
    metrics: Metrics,
}

impl TenantCacheCleaner {
    pub fn new(cache: Arc<TenantRegistryCache>, interval: Duration, metrics: Metrics) -> Self {
        Self {
            cache,
            interval,
            metrics,
        }
    }

    /// Run the clean loop until a shutdown signal is received.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "starting tenant cache cleaner"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let dropped = self.cache.cached().tenants().len();
                    self.cache.clear();
                    self.metrics.record_tenant_cache_clear();
                    tracing::debug!(dropped, "tenant cache cleared");
                }
                _ = shutdown.recv() => {
                    tracing::info!("tenant cache cleaner received shutdown signal");
                    break;
                }
            }
        }

        tracing::info!("tenant cache cleaner stopped");
    }
}
