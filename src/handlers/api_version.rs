// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use axum::{extract::State, http::Method, Json};
use tracing::error;

use super::{ApiError, AppState};
use crate::context::RequestContext;
use crate::proxy::ApiVersionResponse;

/// API versions supported by both the agent and the aggregator.
///
/// # Endpoint
/// `GET /api-version`
pub async fn api_version(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<ApiVersionResponse>, ApiError> {
    let relayed = state
        .forwarder
        .forward(&ctx, Method::GET, "/api-version", None)
        .await
        .map_err(ApiError::Forward)?;

    let aggregator: ApiVersionResponse = serde_json::from_slice(&relayed.body).map_err(|e| {
        error!(
            status = relayed.status.as_u16(),
            error = %e,
            "failed to decode dbaas aggregator api-version"
        );
        ApiError::AggregatorResponse(e)
    })?;

    Ok(Json(ApiVersionResponse::agent().negotiate(&aggregator)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::tests::test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn spec(root: &str, major: u32, minor: u32, supported: &[u32]) -> Value {
        json!({"specRootUrl": root, "major": major, "minor": minor, "supportedMajors": supported})
    }

    async fn call(aggregator_url: &str) -> (StatusCode, Value) {
        let app = Router::new()
            .route("/api-version", get(api_version))
            .with_state(test_state(aggregator_url));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api-version")
                    .header("x-request-id", "req-9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_negotiated_with_aggregator() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api-version"))
            .and(header("x-request-id", "req-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "specs": [
                    spec("/api", 3, 12, &[2, 3]),
                    spec("/api/bluegreen", 1, 3, &[1]),
                    spec("/api/declarations", 1, 0, &[1]),
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = call(&server.uri()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "specs": [spec("/api", 3, 12, &[3]), spec("/api/declarations", 1, 0, &[1])]
            })
        );
    }

    #[tokio::test]
    async fn test_undecodable_aggregator_body_is_500() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api-version"))
            .respond_with(ResponseTemplate::new(500).set_body_string("unknown server error"))
            .mount(&server)
            .await;

        let (status, body) = call(&server.uri()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "error happened during unmarshal DBaaS response");
    }

    #[tokio::test]
    async fn test_unreachable_aggregator_is_500() {
        let (status, body) = call("http://127.0.0.1:1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error happened during forwarding request to DBaaS");
    }
}
