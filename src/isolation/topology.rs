//! Composite Platform Topology Cache
//!
//! Holds the last composite platform structure fetched from the control
//! plane. The value is only ever replaced wholesale by a successful refresh;
//! a failed refresh leaves it untouched. Nothing clears it.

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::FetchError;
use crate::context::RequestContext;

// =============================================================================
// Topology
// =============================================================================

/// Composite platform: one baseline namespace plus its satellites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeTopology {
    pub baseline: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub satellites: BTreeSet<String>,
}

impl CompositeTopology {
    pub fn new<I, S>(baseline: impl Into<String>, satellites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            baseline: baseline.into(),
            satellites: satellites.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `namespace` is the baseline or one of the satellites.
    pub fn contains(&self, namespace: &str) -> bool {
        self.baseline == namespace || self.satellites.contains(namespace)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeSet<String>>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Source
// =============================================================================

/// Authority that knows the composite platform topology.
#[async_trait]
pub trait TopologySource: Send + Sync {
    async fn fetch_topology(&self, ctx: &RequestContext) -> Result<CompositeTopology, FetchError>;
}

// =============================================================================
// Lookup Outcome
// =============================================================================

/// Result of a refresh-then-fallback lookup.
#[derive(Debug)]
pub enum TopologyLookup {
    /// The authority answered; the cache now holds this value.
    Fresh(Arc<CompositeTopology>),

    /// The authority failed; this is the last successfully fetched value.
    Stale {
        topology: Arc<CompositeTopology>,
        error: FetchError,
    },

    /// The authority failed and nothing was ever cached.
    Unavailable(FetchError),
}

impl TopologyLookup {
    /// Topology usable for a decision, fresh or stale.
    pub fn topology(&self) -> Option<&CompositeTopology> {
        match self {
            TopologyLookup::Fresh(topology) => Some(topology.as_ref()),
            TopologyLookup::Stale { topology, .. } => Some(topology.as_ref()),
            TopologyLookup::Unavailable(_) => None,
        }
    }

    /// Label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            TopologyLookup::Fresh(_) => "fresh",
            TopologyLookup::Stale { .. } => "stale",
            TopologyLookup::Unavailable(_) => "unavailable",
        }
    }
}

// =============================================================================
// Topology Cache
// =============================================================================

/// Single-value cache of the composite platform topology.
pub struct TopologyCache {
    source: Arc<dyn TopologySource>,
    current: ArcSwapOption<CompositeTopology>,
}

impl TopologyCache {
    /// Create an empty cache in front of `source`.
    pub fn new(source: Arc<dyn TopologySource>) -> Self {
        Self {
            source,
            current: ArcSwapOption::empty(),
        }
    }

    /// Fetch from the authority; on success replace the cached value.
    pub async fn refresh(
        &self,
        ctx: &RequestContext,
    ) -> Result<Arc<CompositeTopology>, FetchError> {
        let topology = Arc::new(self.source.fetch_topology(ctx).await?);
        self.current.store(Some(Arc::clone(&topology)));
        debug!(
            baseline = %topology.baseline,
            satellites = ?topology.satellites,
            "composite topology refreshed"
        );
        Ok(topology)
    }

    /// Last successfully fetched value, without any network call.
    pub fn cached(&self) -> Option<Arc<CompositeTopology>> {
        self.current.load_full()
    }

    /// Refresh, falling back to the cached value when the authority fails.
    pub async fn resolve(&self, ctx: &RequestContext) -> TopologyLookup {
        match self.refresh(ctx).await {
            Ok(topology) => TopologyLookup::Fresh(topology),
            Err(error) => match self.cached() {
                Some(topology) => {
                    warn!(
                        error = %error,
                        baseline = %topology.baseline,
                        satellites = ?topology.satellites,
                        "failed to get composite topology from control plane, using cached value"
                    );
                    TopologyLookup::Stale { topology, error }
                }
                None => {
                    warn!(
                        error = %error,
                        "failed to get composite topology from control plane, nothing cached"
                    );
                    TopologyLookup::Unavailable(error)
                }
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
