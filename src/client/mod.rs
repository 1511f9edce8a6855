// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Outbound Client Module
//!
//! Shared HTTP plumbing for the control plane and tenant manager calls.

pub mod rest;
pub mod token;

pub use rest::{FetchError, RestClient};
pub use token::{FileTokenSource, StaticTokenSource, TokenError, TokenSource};
