//! Request Context
//!
//! Per-request data carried from the inbound call into every outbound
//! authority call: the context-propagation headers (tracing, request id,
//! tenant) and the tenant bound to the caller.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderName},
};
use std::convert::Infallible;

/// Header carrying the tenant bound to the caller's authenticated context.
pub const TENANT_HEADER: &str = "tenant";

/// Headers copied unchanged from the inbound request to outbound calls.
pub const PROPAGATED_HEADERS: &[&str] = &[
    "x-request-id",
    "traceparent",
    "tracestate",
    "b3",
    "x-b3-traceid",
    "x-b3-spanid",
    "x-b3-parentspanid",
    "x-b3-sampled",
    "x-b3-flags",
    TENANT_HEADER,
    "accept-language",
    "x-version",
    "x-version-name",
    "allowed-headers",
];

/// Context of one inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    propagated: HeaderMap,
    tenant: Option<String>,
}

impl RequestContext {
    /// Capture the propagated headers and caller tenant from inbound headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut propagated = HeaderMap::new();
        for &name in PROPAGATED_HEADERS {
            let name = HeaderName::from_static(name);
            for value in headers.get_all(&name) {
                propagated.append(name.clone(), value.clone());
            }
        }

        let tenant = headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Self { propagated, tenant }
    }

    /// Context for calls that do not originate from a client request.
    pub fn background() -> Self {
        Self::default()
    }

    /// Tenant bound to the caller's authenticated context, if any.
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Headers to copy onto outbound requests.
    pub fn propagated_headers(&self) -> &HeaderMap {
        &self.propagated
    }

    /// Request id for log correlation.
    pub fn request_id(&self) -> Option<&str> {
        self.propagated
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestContext::from_headers(&parts.headers))
    }
}
