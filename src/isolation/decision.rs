// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Authorization Decisions
//!
//! Tri-state outcome of the isolation checks: allow, deny with a policy
//! reason, or fail closed because the authority could not be consulted.

use serde::Serialize;
use std::fmt;

/// Policy reason for a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Candidate namespace is neither own, baseline nor satellite.
    NamespaceNotInComposite,
    /// Body tenant differs from the caller's tenant.
    TenantMismatch,
    /// Tenant not found in the registry (or the registry was unreachable).
    UnknownTenant,
}

/// Reason an authorization decision could not be made safely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// No fresh and no cached composite topology.
    TopologyUnavailable,
}

/// Outcome of one authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny(DenyReason),
    FailClosed(FailReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Outcome label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny(_) => "deny",
            Decision::FailClosed(_) => "fail_closed",
        }
    }

    /// Reason label for metrics; empty for allow.
    pub fn reason(&self) -> &'static str {
        match self {
            Decision::Allow => "",
            Decision::Deny(reason) => reason.as_str(),
            Decision::FailClosed(reason) => reason.as_str(),
        }
    }
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NamespaceNotInComposite => "namespace_not_in_composite",
            DenyReason::TenantMismatch => "tenant_mismatch",
            DenyReason::UnknownTenant => "unknown_tenant",
        }
    }
}

impl FailReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailReason::TopologyUnavailable => "topology_unavailable",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::Deny(reason) => write!(f, "deny({})", reason.as_str()),
            Decision::FailClosed(reason) => write!(f, "fail_closed({})", reason.as_str()),
        }
    }
}
