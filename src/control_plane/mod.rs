//! Control Plane Module
//!
//! HTTP client for the composite platform topology authority.

pub mod client;

pub use client::ControlPlaneClient;
