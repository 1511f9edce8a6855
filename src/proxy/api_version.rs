// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! API Version Negotiation
//!
//! The agent advertises only what both it and the aggregator behind it
//! support: for every spec root known to both, the agent's major, the
//! lower of the two minors and the majors supported on both sides.

use serde::{Deserialize, Serialize};

/// Version info of one API surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVersionInfo {
    pub spec_root_url: String,
    pub major: u32,
    pub minor: u32,
    #[serde(default)]
    pub supported_majors: Vec<u32>,
}

impl ApiVersionInfo {
    fn new(spec_root_url: &str, major: u32, minor: u32, supported_majors: &[u32]) -> Self {
        Self {
            spec_root_url: spec_root_url.to_string(),
            major,
            minor,
            supported_majors: supported_majors.to_vec(),
        }
    }
}

/// Body of `GET /api-version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersionResponse {
    pub specs: Vec<ApiVersionInfo>,
}

impl ApiVersionResponse {
    /// API surfaces this agent serves.
    pub fn agent() -> Self {
        Self {
            specs: vec![
                ApiVersionInfo::new("/api", 3, 14, &[3]),
                ApiVersionInfo::new("/api/declarations", 1, 0, &[1]),
                ApiVersionInfo::new("/api/composite", 1, 0, &[1]),
            ],
        }
    }

    /// Intersect with the aggregator's versions.
    ///
    /// Spec roots the aggregator does not report are dropped.
    pub fn negotiate(&self, aggregator: &ApiVersionResponse) -> ApiVersionResponse {
        let mut specs = Vec::new();
        for own in &self.specs {
            for theirs in aggregator
                .specs
                .iter()
                .filter(|s| s.spec_root_url == own.spec_root_url)
            {
                let supported_majors = theirs
                    .supported_majors
                    .iter()
                    .copied()
                    .filter(|major| own.supported_majors.contains(major))
                    .collect();

                specs.push(ApiVersionInfo {
                    spec_root_url: own.spec_root_url.clone(),
                    major: own.major,
                    minor: own.minor.min(theirs.minor),
                    supported_majors,
                });
            }
        }
        ApiVersionResponse { specs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_negotiate_takes_lower_minor_and_common_majors() {
        let agent = ApiVersionResponse {
            specs: vec![
                ApiVersionInfo::new("/api", 3, 14, &[2, 3]),
                ApiVersionInfo::new("/api/declarations", 1, 0, &[1]),
            ],
        };
        let aggregator = ApiVersionResponse {
            specs: vec![
                ApiVersionInfo::new("/api", 3, 12, &[3]),
                ApiVersionInfo::new("/api/bluegreen", 1, 3, &[1]),
                ApiVersionInfo::new("/api/declarations", 1, 2, &[1]),
            ],
        };

        let result = agent.negotiate(&aggregator);
        assert_eq!(
            result.specs,
            vec![
                ApiVersionInfo::new("/api", 3, 12, &[3]),
                ApiVersionInfo::new("/api/declarations", 1, 0, &[1]),
            ]
        );
    }

    #[test]
    fn test_unknown_roots_dropped() {
        let aggregator = ApiVersionResponse {
            specs: vec![ApiVersionInfo::new("/api/bluegreen", 1, 3, &[1])],
        };
        assert!(ApiVersionResponse::agent().negotiate(&aggregator).specs.is_empty());
    }

    #[test]
    fn test_wire_format() {
        let parsed: ApiVersionResponse = serde_json::from_value(json!({
            "specs": [{"specRootUrl": "/api", "major": 3, "minor": 14, "supportedMajors": [3]}]
        }))
        .unwrap();
        assert_eq!(parsed.specs[0], ApiVersionInfo::new("/api", 3, 14, &[3]));

        let out = serde_json::to_value(&parsed).unwrap();
        assert_eq!(out["specs"][0]["specRootUrl"], "/api");
        assert_eq!(out["specs"][0]["supportedMajors"], json!([3]));
    }

    #[test]
    fn test_missing_specs_rejected() {
        let result: Result<ApiVersionResponse, _> =
            serde_json::from_value(json!({"error": "unknown server error"}));
        assert!(result.is_err());
    }
}
