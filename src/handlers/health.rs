// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::atomic::Ordering;

use super::{ApiError, AppState};
use crate::context::RequestContext;

/// Probe response body.
#[derive(Serialize)]
struct ProbeResponse {
    status: &'static str,
}

/// Kubernetes liveness probe endpoint.
///
/// Returns 200 OK while the process is alive.
///
/// # Endpoint
/// `GET /probes/live`
pub async fn probe_live() -> Response {
    (StatusCode::OK, Json(ProbeResponse { status: "ok" })).into_response()
}

/// Kubernetes readiness probe endpoint.
///
/// Returns 503 once shutdown has begun, 200 otherwise.
///
/// # Endpoint
/// `GET /probes/ready`
pub async fn probe_ready(State(state): State<AppState>) -> Response {
    if state.shutting_down.load(Ordering::SeqCst) {
        let response = ProbeResponse {
            status: "shutting_down",
        };
        return (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response();
    }

    (StatusCode::OK, Json(ProbeResponse { status: "ok" })).into_response()
}

/// Aggregator health, forwarded as-is.
///
/// # Endpoint
/// `GET /health`
pub async fn aggregator_health(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Response, ApiError> {
    let relayed = state
        .forwarder
        .forward(&ctx, Method::GET, "/health", None)
        .await
        .map_err(ApiError::Forward)?;
    Ok(relayed.into_response())
}
