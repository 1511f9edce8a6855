// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! Tenant Manager Module

pub mod client;

pub use client::{TenantManagerClient, TenantRecord};
