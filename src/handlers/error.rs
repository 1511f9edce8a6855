// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! API Error Response
//!
//! Every error leaving the agent is `{"error": "<message>"}`. Denial
//! messages say "not allowed" and never reveal topology or registry
//! contents.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::isolation::{ClassifierError, Decision};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete request body (400)
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    /// Missing or malformed bearer credential (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Tenant check denied (403)
    #[error("you are not allowed to access this tenant")]
    TenantDenied(Decision),

    /// Namespace check denied or failed closed (403)
    #[error("You are not allowed to access this namespace")]
    NamespaceDenied(Decision),

    /// Enriched body could not be encoded (500)
    #[error("failed to add originService field to forwarding request")]
    Encode(#[from] serde_json::Error),

    /// Aggregator unreachable (500)
    #[error("Error happened during forwarding request to DBaaS")]
    Forward(#[source] reqwest::Error),

    /// Aggregator answered with an undecodable body (500)
    #[error("error happened during unmarshal DBaaS response")]
    AggregatorResponse(#[source] serde_json::Error),

    /// Aggregator too old to know the route (404)
    #[error("Not Found. Check dbaas-aggregator version, which must be 3.12.0 or higher")]
    AggregatorOutdated,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Classifier(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::TenantDenied(_) | ApiError::NamespaceDenied(_) => StatusCode::FORBIDDEN,
            ApiError::Encode(_) | ApiError::Forward(_) | ApiError::AggregatorResponse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::AggregatorOutdated => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }

        response
    }
}
