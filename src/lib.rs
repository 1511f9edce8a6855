//! DBaaS Agent
//!
//! Namespace and tenant isolation in front of a shared DBaaS aggregator.
//! Requests are authorized against the composite platform topology
//! (control plane) and the tenant registry (tenant manager), then forwarded.

pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod control_plane;
pub mod handlers;
pub mod isolation;
pub mod metrics;
pub mod proxy;
pub mod tenant_manager;
