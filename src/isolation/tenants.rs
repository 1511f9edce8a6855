//! Tenant Registry Cache
//!
//! Snapshot of every tenant identifier known to the tenant manager.
//! Refreshed on demand by authorization calls, emptied by the periodic
//! cleaner. Every change replaces the whole snapshot.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::client::FetchError;
use crate::context::RequestContext;

/// Authority that knows the full tenant list.
#[async_trait]
pub trait TenantSource: Send + Sync {
    async fn fetch_tenants(&self, ctx: &RequestContext) -> Result<Vec<String>, FetchError>;
}

/// One immutable view of the tenant registry.
#[derive(Debug, Clone, Default)]
pub struct TenantSnapshot {
    tenants: Vec<String>,
    fetched_at: Option<DateTime<Utc>>,
}

impl TenantSnapshot {
    fn fetched(tenants: Vec<String>) -> Self {
        Self {
            tenants,
            fetched_at: Some(Utc::now()),
        }
    }

    pub fn tenants(&self) -> &[String] {
        &self.tenants
    }

    pub fn contains(&self, tenant: &str) -> bool {
        self.tenants.iter().any(|t| t == tenant)
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }

    /// When this snapshot was fetched; `None` for the empty snapshot.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }
}

/// Single-value cache of the tenant registry.
pub struct TenantRegistryCache {
    source: Arc<dyn TenantSource>,
    snapshot: ArcSwap<TenantSnapshot>,
}

impl TenantRegistryCache {
    /// Create an empty cache in front of `source`.
    pub fn new(source: Arc<dyn TenantSource>) -> Self {
        Self {
            source,
            snapshot: ArcSwap::from_pointee(TenantSnapshot::default()),
        }
    }

    /// Fetch the complete tenant list; on success replace the snapshot.
    pub async fn refresh(&self, ctx: &RequestContext) -> Result<Arc<TenantSnapshot>, FetchError> {
        let tenants = self.source.fetch_tenants(ctx).await?;
        let snapshot = Arc::new(TenantSnapshot::fetched(tenants));
        self.snapshot.store(Arc::clone(&snapshot));
        debug!(tenants = snapshot.tenants.len(), "tenant registry refreshed");
        Ok(snapshot)
    }

    /// Current snapshot, possibly empty.
    pub fn cached(&self) -> Arc<TenantSnapshot> {
        self.snapshot.load_full()
    }

    /// Whether the current snapshot lists `tenant`.
    pub fn contains(&self, tenant: &str) -> bool {
        self.snapshot.load().contains(tenant)
    }

    /// Reset to the empty snapshot.
    pub fn clear(&self) {
        self.snapshot.store(Arc::new(TenantSnapshot::default()));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted tenant registry counting its calls.
    pub(crate) struct FakeTenantSource {
        response: Mutex<Option<Vec<String>>>,
        calls: AtomicUsize,
    }

    impl FakeTenantSource {
        pub(crate) fn answering(tenants: &[&str]) -> Self {
            Self {
                response: Mutex::new(Some(tenants.iter().map(|t| t.to_string()).collect())),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                response: Mutex::new(None),
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn set(&self, tenants: Option<&[&str]>) {
            *self.response.lock().unwrap() =
                tenants.map(|list| list.iter().map(|t| t.to_string()).collect());
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TenantSource for FakeTenantSource {
        async fn fetch_tenants(&self, _ctx: &RequestContext) -> Result<Vec<String>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| FetchError::Status {
                    status: 500,
                    body: "unknown server error".to_string(),
                })
        }
    }

    #[tokio::test]
    async fn test_refresh_and_contains() {
        let cache = TenantRegistryCache::new(Arc::new(FakeTenantSource::answering(&["t1", "t2"])));
        assert!(cache.cached().is_empty());
        assert!(cache.cached().fetched_at().is_none());

        let snapshot = cache.refresh(&RequestContext::background()).await.unwrap();
        assert_eq!(snapshot.tenants(), ["t1", "t2"]);
        assert!(snapshot.fetched_at().is_some());
        assert!(cache.contains("t1"));
        assert!(!cache.contains("t3"));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot() {
        let source = Arc::new(FakeTenantSource::answering(&["t1"]));
        let cache = TenantRegistryCache::new(source.clone());
        let ctx = RequestContext::background();
        cache.refresh(&ctx).await.unwrap();

        source.set(None);
        assert!(cache.refresh(&ctx).await.is_err());
        assert!(cache.contains("t1"));
    }

    #[tokio::test]
    async fn test_clear_empties_snapshot() {
        let cache = TenantRegistryCache::new(Arc::new(FakeTenantSource::answering(&["t1"])));
        cache.refresh(&RequestContext::background()).await.unwrap();

        let before = cache.cached();
        cache.clear();

        assert!(cache.cached().is_empty());
        assert!(!cache.contains("t1"));
        // readers holding the old snapshot keep a consistent view
        assert!(before.contains("t1"));
    }
}
