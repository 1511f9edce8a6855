// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Configuration loaded from environment variables.
///
/// All configuration is externalized to support 12-factor app deployment.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "json" or "pretty" (default: json)
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Namespace the agent is deployed in
    #[serde(default)]
    pub namespace: String,

    /// Namespace isolation switch (default: true)
    #[serde(default = "default_isolation_enabled")]
    pub namespace_isolation_enabled: bool,

    /// DBaaS aggregator base URL
    #[serde(default = "default_dbaas_address")]
    pub dbaas_address: String,

    /// Cluster DBA username for the aggregator
    #[serde(default)]
    pub dbaas_username: String,

    /// Cluster DBA password for the aggregator
    #[serde(default)]
    pub dbaas_password: String,

    /// Aggregator request timeout in seconds (default: 600)
    #[serde(default = "default_dbaas_request_timeout")]
    pub dbaas_request_timeout_secs: u64,

    /// Control plane base URL (composite platform topology)
    #[serde(default = "default_control_plane_url")]
    pub control_plane_url: String,

    /// Tenant manager base URL (tenant registry)
    #[serde(default = "default_tenant_manager_url")]
    pub tenant_manager_url: String,

    /// Timeout for control plane and tenant manager calls (default: 30)
    #[serde(default = "default_authority_timeout")]
    pub authority_timeout_secs: u64,

    /// Bearer credential for outbound authority calls
    #[serde(default)]
    pub m2m_token: Option<String>,

    /// Mounted token file for outbound authority calls; wins over `m2m_token`
    #[serde(default)]
    pub m2m_token_path: Option<String>,

    /// Tenant cache clean interval in seconds (default: 120)
    #[serde(default = "default_tenant_cache_clean_interval")]
    pub tenant_cache_clean_interval_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Env(#[from] envy::Error),

    #[error("NAMESPACE must not be empty when namespace isolation is enabled")]
    MissingNamespace,

    #[error("TENANT_CACHE_CLEAN_INTERVAL_SECS must be greater than zero")]
    ZeroCleanInterval,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_isolation_enabled() -> bool {
    true
}

fn default_dbaas_address() -> String {
    "http://dbaas-aggregator.dbaas:8080".to_string()
}

fn default_dbaas_request_timeout() -> u64 {
    600
}

fn default_control_plane_url() -> String {
    "http://internal-gateway-service:8080/api/v3/control-plane".to_string()
}

fn default_tenant_manager_url() -> String {
    "http://internal-gateway-service:8080/api/v4/tenant-manager/manage".to_string()
}

fn default_authority_timeout() -> u64 {
    30
}

fn default_tenant_cache_clean_interval() -> u64 {
    120
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are uppercase with underscore separators.
    /// Example: `NAMESPACE`, `DBAAS_ADDRESS`, `LOG_LEVEL`, etc.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Config = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the agent cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace_isolation_enabled && self.namespace.is_empty() {
            return Err(ConfigError::MissingNamespace);
        }
        if self.tenant_cache_clean_interval_secs == 0 {
            return Err(ConfigError::ZeroCleanInterval);
        }
        Ok(())
    }

    pub fn dbaas_request_timeout(&self) -> Duration {
        Duration::from_secs(self.dbaas_request_timeout_secs)
    }

    pub fn authority_timeout(&self) -> Duration {
        Duration::from_secs(self.authority_timeout_secs)
    }

    pub fn tenant_cache_clean_interval(&self) -> Duration {
        Duration::from_secs(self.tenant_cache_clean_interval_secs)
    }
}
