// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! REST Client
//!
//! Secured GET requests towards the internal authorities. Each request
//! carries the outbound bearer credential and the inbound request's
//! propagated headers, untouched.

use bytes::Bytes;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::token::{TokenError, TokenSource};
use crate::context::RequestContext;

// =============================================================================
// Error Types
// =============================================================================

/// Failure of one authority fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status: expected 200 but got {status}, response: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to obtain bearer token: {0}")]
    Token(#[from] TokenError),

    #[error("invalid bearer token")]
    InvalidToken,
}

// =============================================================================
// REST Client
// =============================================================================

/// HTTP client shared by the control plane and tenant manager clients.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    token_source: Arc<dyn TokenSource>,
}

impl RestClient {
    /// Create a new client with the given request timeout.
    pub fn new(token_source: Arc<dyn TokenSource>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            token_source,
        })
    }

    /// GET `url` and return the body of a 200 response.
    ///
    /// Any other status is a [`FetchError::Status`] carrying the body as
    /// diagnostic text.
    pub async fn get_ok(&self, ctx: &RequestContext, url: &str) -> Result<Bytes, FetchError> {
        let mut request = self
            .client
            .get(url)
            .headers(ctx.propagated_headers().clone())
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = self.token_source.token(ctx).await? {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| FetchError::InvalidToken)?;
            request = request.header(AUTHORIZATION, value);
        }

        debug!(url = %url, request_id = ?ctx.request_id(), "sending secured GET");

        let response = request.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "secured GET failed");
            e
        })?;

        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body)
    }
}

/// Join a base URL and a path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
