// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Tenant Manager API Client
//!
//! Lists every tenant registered in the tenant manager.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::client::rest::join_url;
use crate::client::{FetchError, RestClient};
use crate::context::RequestContext;
use crate::isolation::TenantSource;

const TENANTS_PATH: &str = "tenants";

/// One entry of the tenant list. Other fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TenantRecord {
    #[serde(rename = "externalId")]
    pub external_id: String,
}

/// Client for the tenant manager API.
pub struct TenantManagerClient {
    rest: RestClient,
    base_url: String,
}

impl TenantManagerClient {
    pub fn new(rest: RestClient, base_url: impl Into<String>) -> Self {
        Self {
            rest,
            base_url: base_url.into(),
        }
    }

    /// Fetch all tenant records.
    pub async fn list_tenants(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<TenantRecord>, FetchError> {
        let url = join_url(&self.base_url, TENANTS_PATH);
        debug!(url = %url, "getting tenant list");

        let body = self.rest.get_ok(ctx, &url).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TenantSource for TenantManagerClient {
    async fn fetch_tenants(&self, ctx: &RequestContext) -> Result<Vec<String>, FetchError> {
        let records = self.list_tenants(ctx).await?;
        Ok(records.into_iter().map(|r| r.external_id).collect())
    }
}
