// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use prometheus::TEXT_FORMAT;

use crate::metrics::Metrics;

/// Isolation decisions, authority fetches and tenant cache clears in the
/// Prometheus text format.
///
/// # Endpoints
/// `GET /prometheus`, `GET /metrics`
pub async fn metrics_handler(State(metrics): State<Metrics>) -> Response {
    let mut response = metrics.encode().into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(TEXT_FORMAT),
    );
    response
}
