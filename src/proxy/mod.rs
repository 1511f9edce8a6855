// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
mod api_version;
mod forwarder;

pub use api_version::{ApiVersionInfo, ApiVersionResponse};
pub use forwarder::{BasicCredentials, Forwarder, Relayed};
