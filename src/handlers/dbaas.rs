// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Database API Handlers
//!
//! Authorizes database requests against the isolation engine and forwards
//! them to the aggregator under the same path.
//!
//! Classifier-bearing routes run their checks in a fixed order:
//! body decode, classifier validation, tenant, path namespace, classifier
//! namespace, `originService` enrichment, forward. The first failing step
//! answers the request.

use axum::{
    body::Bytes,
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::info;

use super::{ApiError, AppState};
use crate::context::RequestContext;
use crate::isolation::RequestBody;
use crate::proxy::Relayed;

// =============================================================================
// Route Checks
// =============================================================================

/// When the tenant check runs for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TenantCheck {
    Always,
    /// Only when the caller's context carries a tenant
    WhenContextTenant,
    Skip,
}

/// Checks applied before forwarding a classifier-bearing request.
#[derive(Debug, Clone, Copy)]
struct RouteChecks {
    tenant: TenantCheck,
    classifier_namespace: bool,
}

const FULL_CHECKS: RouteChecks = RouteChecks {
    tenant: TenantCheck::Always,
    classifier_namespace: true,
};

fn path_and_query(uri: &Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
}

/// Authorize the namespace against the engine, mapping a refusal to 403.
async fn check_namespace(
    state: &AppState,
    ctx: &RequestContext,
    namespace: &str,
) -> Result<(), ApiError> {
    let decision = state.engine.authorize_namespace(ctx, namespace).await;
    if decision.is_allowed() {
        Ok(())
    } else {
        Err(ApiError::NamespaceDenied(decision))
    }
}

/// Run the checks for a classifier-bearing route, enrich and forward.
async fn authorize_and_forward(
    state: &AppState,
    ctx: &RequestContext,
    method: Method,
    uri: &Uri,
    namespace: &str,
    raw_body: &[u8],
    checks: RouteChecks,
) -> Result<Relayed, ApiError> {
    let mut body = RequestBody::parse(raw_body)?;
    let service_name = body.service_name()?.to_string();

    info!(
        method = %method,
        path = %uri.path(),
        namespace = %namespace,
        db_type = ?body.field("type"),
        classifier = ?body.classifier(),
        "received database request"
    );

    let run_tenant_check = match checks.tenant {
        TenantCheck::Always => true,
        TenantCheck::WhenContextTenant => ctx.tenant().is_some(),
        TenantCheck::Skip => false,
    };
    if run_tenant_check {
        let decision = state.engine.authorize_tenant(ctx, &body, ctx.tenant()).await;
        if !decision.is_allowed() {
            return Err(ApiError::TenantDenied(decision));
        }
    }

    check_namespace(state, ctx, namespace).await?;

    if checks.classifier_namespace {
        let classifier_namespace = body.classifier_namespace()?;
        check_namespace(state, ctx, classifier_namespace).await?;
    }

    body.enrich_origin_service(&service_name);
    let enriched = Bytes::from(body.to_bytes()?);

    state
        .forwarder
        .forward(ctx, method, path_and_query(uri), Some(enriched))
        .await
        .map_err(ApiError::Forward)
}

// =============================================================================
// Handlers
// =============================================================================

/// Get or create a database.
///
/// # Endpoint
/// `PUT /api/v3/dbaas/:namespace/databases`
pub async fn get_or_create_database(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    ctx: RequestContext,
    method: Method,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Result<Response, ApiError> {
    let relayed =
        authorize_and_forward(&state, &ctx, method, &uri, &namespace, &body, FULL_CHECKS).await?;
    Ok(relayed.into_response())
}

/// Get a database connection by classifier.
///
/// # Endpoint
/// `POST /api/v3/dbaas/:namespace/databases/get-by-classifier/:type`
pub async fn get_by_classifier(
    State(state): State<AppState>,
    Path((namespace, _db_type)): Path<(String, String)>,
    ctx: RequestContext,
    method: Method,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Result<Response, ApiError> {
    let relayed =
        authorize_and_forward(&state, &ctx, method, &uri, &namespace, &body, FULL_CHECKS).await?;
    Ok(relayed.into_response())
}

/// Delete a database by classifier.
///
/// Only the path namespace is checked; the classifier still has to name
/// the originating service.
///
/// # Endpoint
/// `DELETE /api/v3/dbaas/:namespace/databases/:type`
pub async fn delete_by_classifier(
    State(state): State<AppState>,
    Path((namespace, _db_type)): Path<(String, String)>,
    ctx: RequestContext,
    method: Method,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Result<Response, ApiError> {
    let checks = RouteChecks {
        tenant: TenantCheck::Skip,
        classifier_namespace: false,
    };
    let relayed =
        authorize_and_forward(&state, &ctx, method, &uri, &namespace, &body, checks).await?;
    Ok(relayed.into_response())
}

/// Register an externally manageable database.
///
/// A 404 from the aggregator means it predates this route.
///
/// # Endpoint
/// `PUT /api/v3/dbaas/:namespace/databases/registration/externally_manageable`
pub async fn register_externally_manageable(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    ctx: RequestContext,
    method: Method,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Result<Response, ApiError> {
    let checks = RouteChecks {
        tenant: TenantCheck::WhenContextTenant,
        classifier_namespace: true,
    };
    let relayed =
        authorize_and_forward(&state, &ctx, method, &uri, &namespace, &body, checks).await?;

    if relayed.status == StatusCode::NOT_FOUND {
        tracing::warn!("check dbaas-aggregator version, which must be 3.12.0 or higher");
        return Err(ApiError::AggregatorOutdated);
    }
    Ok(relayed.into_response())
}

/// List all databases of a namespace.
///
/// # Endpoint
/// `GET /api/v3/dbaas/:namespace/databases/list`
pub async fn list_databases(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    ctx: RequestContext,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, ApiError> {
    info!(namespace = %namespace, "request to list databases");
    check_namespace(&state, &ctx, &namespace).await?;

    let relayed = state
        .forwarder
        .forward(&ctx, Method::GET, path_and_query(&uri), None)
        .await
        .map_err(ApiError::Forward)?;
    Ok(relayed.into_response())
}

/// Forward without isolation checks.
///
/// Used by the physical databases listing, the declarative API and the
/// composite structure API.
pub async fn pass_through(
    State(state): State<AppState>,
    ctx: RequestContext,
    method: Method,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Result<Response, ApiError> {
    info!(method = %method, path = %uri.path(), "forwarding request");
    let body = (!body.is_empty()).then_some(body);

    let relayed = state
        .forwarder
        .forward(&ctx, method, path_and_query(&uri), body)
        .await
        .map_err(ApiError::Forward)?;
    Ok(relayed.into_response())
}

// =============================================================================
// Tests
// =============================================================================
