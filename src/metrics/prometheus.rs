use prometheus::{CounterVec, Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Prometheus metrics for the isolation agent.
///
/// Thread-safe metrics registry for tracking authorization decisions,
/// authority fetches and tenant cache clears.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    /// Decision counter: dbaas_agent_authz_decisions_total{check, outcome, reason}
    authz_decisions: CounterVec,

    /// Fetch counter: dbaas_agent_authority_fetch_total{authority, result}
    authority_fetch: CounterVec,

    /// Clear counter: dbaas_agent_tenant_cache_clears_total
    tenant_cache_clears: IntCounter,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let authz_decisions = CounterVec::new(
            Opts::new(
                "dbaas_agent_authz_decisions_total",
                "Isolation authorization decisions",
            ),
            &["check", "outcome", "reason"],
        )
        .expect("failed to create authz_decisions counter");

        let authority_fetch = CounterVec::new(
            Opts::new(
                "dbaas_agent_authority_fetch_total",
                "Control plane and tenant manager fetches",
            ),
            &["authority", "result"],
        )
        .expect("failed to create authority_fetch counter");

        let tenant_cache_clears = IntCounter::new(
            "dbaas_agent_tenant_cache_clears_total",
            "Periodic tenant cache clears",
        )
        .expect("failed to create tenant_cache_clears counter");

        registry
            .register(Box::new(authz_decisions.clone()))
            .expect("failed to register authz_decisions");
        registry
            .register(Box::new(authority_fetch.clone()))
            .expect("failed to register authority_fetch");
        registry
            .register(Box::new(tenant_cache_clears.clone()))
            .expect("failed to register tenant_cache_clears");

        Self {
            registry: Arc::new(registry),
            authz_decisions,
            authority_fetch,
            tenant_cache_clears,
        }
    }

    /// Record one authorization decision.
    pub fn record_decision(&self, check: &str, outcome: &str, reason: &str) {
        self.authz_decisions
            .with_label_values(&[check, outcome, reason])
            .inc();
    }

    /// Record one authority fetch result ("fresh", "stale", "ok", "error", ...).
    pub fn record_fetch(&self, authority: &str, result: &str) {
        self.authority_fetch
            .with_label_values(&[authority, result])
            .inc();
    }

    /// Record a periodic tenant cache clear.
    pub fn record_tenant_cache_clear(&self) {
        self.tenant_cache_clears.inc();
    }

    /// Number of tenant cache clears so far.
    pub fn tenant_cache_clears(&self) -> u64 {
        self.tenant_cache_clears.get()
    }

    /// Encode metrics in Prometheus text format.
    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!(error = %e, "failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
