// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Outbound bearer credentials.
//!
//! Token issuance lives outside the agent; this is the seam it plugs into.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

use crate::context::RequestContext;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token source unavailable: {0}")]
    Unavailable(String),
}

/// Source of the bearer credential attached to outbound authority calls.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns the token to send, or `None` to send no `Authorization` header.
    async fn token(&self, ctx: &RequestContext) -> Result<Option<String>, TokenError>;
}

/// Token source backed by a fixed credential (or none).
#[derive(Debug, Clone, Default)]
pub struct StaticTokenSource {
    token: Option<String>,
}

impl StaticTokenSource {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn token(&self, _ctx: &RequestContext) -> Result<Option<String>, TokenError> {
        Ok(self.token.clone())
    }
}

/// Token source reading a mounted credential file on every call.
///
/// The file is re-read each time so a rotated token is picked up without a
/// restart. A missing, unreadable or empty file is a token failure.
#[derive(Debug, Clone)]
pub struct FileTokenSource {
    path: PathBuf,
}

impl FileTokenSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenSource for FileTokenSource {
    async fn token(&self, _ctx: &RequestContext) -> Result<Option<String>, TokenError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "can't read M2M token");
            TokenError::Unavailable(format!("{}: {e}", self.path.display()))
        })?;

        let token = content.trim();
        if token.is_empty() {
            return Err(TokenError::Unavailable(format!(
                "{} is empty",
                self.path.display()
            )));
        }
        Ok(Some(token.to_string()))
    }
}
