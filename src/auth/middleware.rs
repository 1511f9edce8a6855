//! Auth Middleware
//!
//! Axum middleware requiring a bearer credential on the database API.
//!
//! Features:
//! - Extract the token from the Authorization header
//! - Reject missing or malformed headers with 401
//!
//! Cryptographic validation happens at the platform gateway in front of the
//! agent; only the presence and shape of the credential are checked here.

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::handlers::ApiError;

// =============================================================================
// Token Extraction
// =============================================================================

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn extract_token(auth_header: &str) -> Result<&str, ApiError> {
    let mut parts = auth_header.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::Unauthorized(
            "Authorization header must start with Bearer".to_string(),
        ));
    }

    match parts.next().map(str::trim) {
        Some(token) if !token.is_empty() && !token.contains(' ') => Ok(token),
        _ => Err(ApiError::Unauthorized(
            "Authorization header must be \"Bearer <token>\"".to_string(),
        )),
    }
}

// =============================================================================
// Auth Middleware
// =============================================================================

/// Bearer authentication middleware.
pub async fn require_bearer(request: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(header) = auth_header else {
        warn!(path = %request.uri().path(), "missing Authorization header");
        return Err(ApiError::Unauthorized("Unauthorized".to_string()));
    };

    extract_token(header).map_err(|e| {
        warn!(path = %request.uri().path(), error = %e, "malformed Authorization header");
        e
    })?;

    debug!(path = %request.uri().path(), "bearer credential present");
    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
