// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Control Plane API Client
//!
//! Reads the composite platform topology this agent's namespace belongs to.
//!
//! Operations:
//! - `GET <base>/composite-platform/namespaces` → `{"baseline", "satellites"}`

use async_trait::async_trait;
use tracing::debug;

use crate::client::rest::join_url;
use crate::client::{FetchError, RestClient};
use crate::context::RequestContext;
use crate::isolation::{CompositeTopology, TopologySource};

const COMPOSITE_NAMESPACES_PATH: &str = "composite-platform/namespaces";

// =============================================================================
// Control Plane Client
// =============================================================================

/// Client for the control plane's composite platform API.
pub struct ControlPlaneClient {
    rest: RestClient,
    base_url: String,
}

impl ControlPlaneClient {
    /// Create a new control plane client.
    ///
    /// `base_url` is the control plane API root, e.g.
    /// `http://internal-gateway-service:8080/api/v3/control-plane`.
    pub fn new(rest: RestClient, base_url: impl Into<String>) -> Self {
        Self {
            rest,
            base_url: base_url.into(),
        }
    }

    /// Fetch the composite platform structure.
    pub async fn composite_namespaces(
        &self,
        ctx: &RequestContext,
    ) -> Result<CompositeTopology, FetchError> {
        let url = join_url(&self.base_url, COMPOSITE_NAMESPACES_PATH);
        debug!(url = %url, "getting composite platform namespaces");

        let body = self.rest.get_ok(ctx, &url).await?;
        let topology: CompositeTopology = serde_json::from_slice(&body)?;
        Ok(topology)
    }
}

#[async_trait]
impl TopologySource for ControlPlaneClient {
    async fn fetch_topology(&self, ctx: &RequestContext) -> Result<CompositeTopology, FetchError> {
        self.composite_namespaces(ctx).await
    }
}

// =============================================================================
// Tests
// =============================================================================
