// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Isolation Engine
//!
//! Answers the two authorization questions the agent asks before
//! forwarding a database request:
//!
//! 1. Namespace: may a request coming from this agent's namespace act on
//!    the candidate namespace? Own namespace always; otherwise only when
//!    both belong to the same composite platform. The topology is
//!    refreshed on every such check and the cached value is used only when
//!    the control plane fails. No topology at all fails closed.
//! 2. Tenant: does the tenant asserted in the body match the caller's
//!    tenant, and is it registered? The registry is consulted cache-first;
//!    a miss forces one refresh.
//!
//! Every denial is logged with both conflicting identifiers.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::classifier::RequestBody;
use super::decision::{Decision, DenyReason, FailReason};
use super::tenants::TenantRegistryCache;
use super::topology::{TopologyCache, TopologyLookup};
use crate::context::RequestContext;
use crate::metrics::Metrics;

// =============================================================================
// Isolation Settings
// =============================================================================

/// Static isolation settings fixed at startup.
#[derive(Debug, Clone)]
pub struct IsolationSettings {
    /// Namespace this agent is deployed in
    pub own_namespace: String,

    /// Whether namespace isolation is enforced
    pub enabled: bool,
}

impl IsolationSettings {
    pub fn new(own_namespace: impl Into<String>, enabled: bool) -> Self {
        Self {
            own_namespace: own_namespace.into(),
            enabled,
        }
    }
}

// =============================================================================
// Isolation Engine
// =============================================================================

/// Authorization core consuming the topology and tenant registry caches.
pub struct IsolationEngine {
    settings: IsolationSettings,
    topology: Arc<TopologyCache>,
    tenants: Arc<TenantRegistryCache>,
    metrics: Metrics,
}

impl IsolationEngine {
    /// Create an engine over the given caches.
    pub fn new(
        settings: IsolationSettings,
        topology: Arc<TopologyCache>,
        tenants: Arc<TenantRegistryCache>,
        metrics: Metrics,
    ) -> Self {
        if settings.enabled {
            info!(
                namespace = %settings.own_namespace,
                "namespace isolation enabled"
            );
        } else {
            info!("namespace isolation disabled");
        }

        Self {
            settings,
            topology,
            tenants,
            metrics,
        }
    }

    /// Decide whether the candidate namespace may be accessed.
    ///
    /// The same policy applies to the namespace from the URL path and to
    /// the namespace declared in a classifier.
    pub async fn authorize_namespace(&self, ctx: &RequestContext, candidate: &str) -> Decision {
        let decision = self.namespace_decision(ctx, candidate).await;
        self.metrics
            .record_decision("namespace", decision.outcome(), decision.reason());
        decision
    }

    async fn namespace_decision(&self, ctx: &RequestContext, candidate: &str) -> Decision {
        if !self.settings.enabled {
            return Decision::Allow;
        }

        let own = self.settings.own_namespace.as_str();
        if candidate == own {
            return Decision::Allow;
        }

        info!(
            request_id = ?ctx.request_id(),
            own_namespace = %own,
            candidate_namespace = %candidate,
            "request targets a foreign namespace, checking composite platform"
        );

        let lookup = self.topology.resolve(ctx).await;
        self.metrics.record_fetch("control_plane", lookup.label());

        match lookup {
            TopologyLookup::Unavailable(error) => {
                warn!(
                    request_id = ?ctx.request_id(),
                    own_namespace = %own,
                    candidate_namespace = %candidate,
                    error = %error,
                    "namespace access failed closed: composite topology unavailable"
                );
                Decision::FailClosed(FailReason::TopologyUnavailable)
            }
            TopologyLookup::Fresh(topology) | TopologyLookup::Stale { topology, .. } => {
                if topology.contains(candidate) {
                    debug!(
                        own_namespace = %own,
                        candidate_namespace = %candidate,
                        baseline = %topology.baseline,
                        "namespace belongs to composite platform"
                    );
                    Decision::Allow
                } else {
                    warn!(
                        request_id = ?ctx.request_id(),
                        own_namespace = %own,
                        candidate_namespace = %candidate,
                        "namespace access denied: not in composite platform"
                    );
                    Decision::Deny(DenyReason::NamespaceNotInComposite)
                }
            }
        }
    }

    /// Decide whether the tenant asserted in `body` may be used.
    ///
    /// Bodies without a tenant identifier are allowed.
    pub async fn authorize_tenant(
        &self,
        ctx: &RequestContext,
        body: &RequestBody,
        tenant_from_context: Option<&str>,
    ) -> Decision {
        let decision = self.tenant_decision(ctx, body, tenant_from_context).await;
        self.metrics
            .record_decision("tenant", decision.outcome(), decision.reason());
        decision
    }

    async fn tenant_decision(
        &self,
        ctx: &RequestContext,
        body: &RequestBody,
        tenant_from_context: Option<&str>,
    ) -> Decision {
        let Some(declared) = body.declared_tenant() else {
            return Decision::Allow;
        };

        if Some(declared) != tenant_from_context {
            warn!(
                request_id = ?ctx.request_id(),
                context_tenant = ?tenant_from_context,
                body_tenant = %declared,
                "tenant access denied: identifiers are not equal"
            );
            return Decision::Deny(DenyReason::TenantMismatch);
        }

        if self.tenants.contains(declared) {
            return Decision::Allow;
        }

        debug!(tenant = %declared, "tenant not found in cache, refreshing from tenant manager");
        match self.tenants.refresh(ctx).await {
            Ok(snapshot) if snapshot.contains(declared) => {
                self.metrics.record_fetch("tenant_manager", "ok");
                Decision::Allow
            }
            Ok(_) => {
                self.metrics.record_fetch("tenant_manager", "ok");
                warn!(
                    request_id = ?ctx.request_id(),
                    context_tenant = ?tenant_from_context,
                    body_tenant = %declared,
                    "tenant access denied: tenant not registered"
                );
                Decision::Deny(DenyReason::UnknownTenant)
            }
            Err(error) => {
                self.metrics.record_fetch("tenant_manager", "error");
                warn!(
                    request_id = ?ctx.request_id(),
                    context_tenant = ?tenant_from_context,
                    body_tenant = %declared,
                    registry_unreachable = true,
                    error = %error,
                    "tenant access denied: could not get tenant list from tenant manager"
                );
                Decision::Deny(DenyReason::UnknownTenant)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
