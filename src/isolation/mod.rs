// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Isolation Module
//!
//! Namespace and tenant isolation for database requests.
//!
//! This module provides:
//! - Composite platform topology cache (refresh first, cached fallback)
//! - Tenant registry cache (cache first, forced refresh on miss)
//! - Periodic tenant cache cleaner
//! - Classifier schema for request bodies
//! - The isolation engine producing allow / deny / fail-closed decisions

pub mod classifier;
pub mod cleaner;
pub mod decision;
pub mod engine;
pub mod tenants;
pub mod topology;

pub use classifier::{Classifier, ClassifierError, RequestBody, ORIGIN_SERVICE_FIELD};
pub use cleaner::TenantCacheCleaner;
pub use decision::{Decision, DenyReason, FailReason};
pub use engine::{IsolationEngine, IsolationSettings};
pub use tenants::{TenantRegistryCache, TenantSnapshot, TenantSource};
pub use topology::{CompositeTopology, TopologyCache, TopologyLookup, TopologySource};
