// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
mod api_version;
mod dbaas;
mod error;
mod health;
mod metrics;

pub use api_version::api_version;
pub use dbaas::{
    delete_by_classifier, get_by_classifier, get_or_create_database, list_databases,
    pass_through, register_externally_manageable,
};
pub use error::ApiError;
pub use health::{aggregator_health, probe_live, probe_ready};
pub use metrics::metrics_handler;

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::require_bearer;
use crate::isolation::IsolationEngine;
use crate::metrics::Metrics;
use crate::proxy::Forwarder;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<IsolationEngine>,
    pub forwarder: Forwarder,
    pub metrics: Metrics,
    /// Flag indicating if we're shutting down
    pub shutting_down: Arc<AtomicBool>,
}

impl FromRef<AppState> for Metrics {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

/// Build the agent router.
pub fn router(state: AppState) -> Router {
    // The first segment after /dbaas is a namespace or, for
    // physical_databases, a database type. Both share one parameter name.
    let api = Router::new()
        .route(
            "/api/v3/dbaas/:namespace/databases",
            put(get_or_create_database),
        )
        .route(
            "/api/v3/dbaas/:namespace/databases/get-by-classifier/:type",
            post(get_by_classifier),
        )
        .route(
            "/api/v3/dbaas/:namespace/databases/registration/externally_manageable",
            put(register_externally_manageable),
        )
        .route(
            "/api/v3/dbaas/:namespace/databases/list",
            get(list_databases),
        )
        .route(
            "/api/v3/dbaas/:namespace/databases/:type",
            delete(delete_by_classifier),
        )
        .route(
            "/api/v3/dbaas/:namespace/physical_databases",
            get(pass_through),
        )
        .route("/api/declarations/v1/apply", post(pass_through))
        .route(
            "/api/declarations/v1/operation/:tracking_id/status",
            get(pass_through),
        )
        .route(
            "/api/declarations/v1/operation/:tracking_id/terminate",
            post(pass_through),
        )
        .route(
            "/api/composite/v1/structures",
            get(pass_through).post(pass_through),
        )
        .route(
            "/api/composite/v1/structures/:composite_id",
            get(pass_through),
        )
        .route(
            "/api/composite/v1/structures/:composite_id/delete",
            delete(pass_through),
        )
        .route_layer(middleware::from_fn(require_bearer));

    Router::new()
        .route("/health", get(aggregator_health))
        .route("/probes/live", get(probe_live))
        .route("/probes/ready", get(probe_ready))
        .route("/api-version", get(api_version))
        .route("/prometheus", get(metrics_handler))
        .route("/metrics", get(metrics_handler))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::isolation::tenants::tests::FakeTenantSource;
    use crate::isolation::topology::tests::FakeTopologySource;
    use crate::isolation::{
        CompositeTopology, IsolationSettings, TenantRegistryCache, TopologyCache,
    };
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    /// Scripted authorities behind a test state.
    #[derive(Clone)]
    pub(crate) struct TestSources {
        pub(crate) topology: Arc<FakeTopologySource>,
        pub(crate) tenants: Arc<FakeTenantSource>,
    }

    impl TestSources {
        pub(crate) fn new(topology: Option<CompositeTopology>, tenants: Option<&[&str]>) -> Self {
            let topology_source = FakeTopologySource::failing();
            topology_source.set(topology);
            let tenant_source = FakeTenantSource::failing();
            tenant_source.set(tenants);
            Self {
                topology: Arc::new(topology_source),
                tenants: Arc::new(tenant_source),
            }
        }
    }

    pub(crate) fn state_with(
        own_namespace: &str,
        isolation_enabled: bool,
        aggregator_url: &str,
        sources: TestSources,
    ) -> (AppState, TestSources) {
        let metrics = Metrics::new();
        let engine = IsolationEngine::new(
            IsolationSettings::new(own_namespace, isolation_enabled),
            Arc::new(TopologyCache::new(sources.topology.clone())),
            Arc::new(TenantRegistryCache::new(sources.tenants.clone())),
            metrics.clone(),
        );
        let forwarder = Forwarder::new(aggregator_url, None, Duration::from_secs(2)).unwrap();

        let state = AppState {
            engine: Arc::new(engine),
            forwarder,
            metrics,
            shutting_down: Arc::new(AtomicBool::new(false)),
        };
        (state, sources)
    }

    pub(crate) fn test_state(aggregator_url: &str) -> AppState {
        state_with("ns-1", true, aggregator_url, TestSources::new(None, None)).0
    }

    #[tokio::test]
    async fn test_router_serves_probes_without_bearer() {
        let app = router(test_state("http://127.0.0.1:1"));

        for uri in ["/probes/live", "/probes/ready", "/metrics"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = router(test_state("http://127.0.0.1:1"));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v2/unknown")
                    .header("authorization", "Bearer token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
