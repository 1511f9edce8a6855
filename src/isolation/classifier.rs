//! Classifier Schema
//!
//! Typed view over a database request body. The body itself stays an
//! opaque JSON object (it is forwarded as-is, plus the `originService`
//! tag); only the fields the isolation checks read are decoded, and a
//! decoding failure is a client error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field carrying the originating service identity to the aggregator.
pub const ORIGIN_SERVICE_FIELD: &str = "originService";

const CLASSIFIER_FIELD: &str = "classifier";
const TENANT_ID_FIELD: &str = "tenantId";

// =============================================================================
// Errors
// =============================================================================

/// Client errors in the request body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("request body must be a JSON object: {0}")]
    MalformedBody(String),

    #[error("request must contain a classifier")]
    MissingClassifier,

    #[error("malformed classifier: {0}")]
    MalformedClassifier(String),

    #[error("request must contain microserviceName in a classifier")]
    MissingServiceName,

    #[error("request must contain namespace in a classifier")]
    MissingNamespace,
}

// =============================================================================
// Classifier
// =============================================================================

/// Logical database identifier supplied by the caller.
///
/// Only the fields the agent acts on are typed; anything else stays in the
/// raw body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classifier {
    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default, rename = "microserviceName")]
    pub microservice_name: Option<String>,

    #[serde(default, rename = "tenantId")]
    pub tenant_id: Option<String>,
}

// =============================================================================
// Request Body
// =============================================================================

/// Parsed request body with its classifier fields decoded.
#[derive(Debug, Clone)]
pub struct RequestBody {
    fields: Map<String, Value>,
    classifier: Option<Classifier>,
    tenant_id: Option<String>,
}

impl RequestBody {
    /// Parse raw bytes. An empty body is an empty object.
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassifierError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::from_value(Value::Object(Map::new()));
        }
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ClassifierError::MalformedBody(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ClassifierError> {
        let Value::Object(fields) = value else {
            return Err(ClassifierError::MalformedBody(
                "expected an object".to_string(),
            ));
        };

        let classifier = match fields.get(CLASSIFIER_FIELD) {
            None | Some(Value::Null) => None,
            Some(value @ Value::Object(_)) => Some(
                Classifier::deserialize(value)
                    .map_err(|e| ClassifierError::MalformedClassifier(e.to_string()))?,
            ),
            Some(_) => {
                return Err(ClassifierError::MalformedClassifier(
                    "expected an object".to_string(),
                ))
            }
        };

        let tenant_id = match fields.get(TENANT_ID_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(tenant)) => Some(tenant.clone()),
            Some(_) => {
                return Err(ClassifierError::MalformedBody(
                    "tenantId must be a string".to_string(),
                ))
            }
        };

        Ok(Self {
            fields,
            classifier,
            tenant_id,
        })
    }

    pub fn classifier(&self) -> Option<&Classifier> {
        self.classifier.as_ref()
    }

    /// Originating service identity: the classifier's `microserviceName`.
    ///
    /// Fails with `MissingClassifier` before looking at the name.
    pub fn service_name(&self) -> Result<&str, ClassifierError> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(ClassifierError::MissingClassifier)?;
        classifier
            .microservice_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(ClassifierError::MissingServiceName)
    }

    /// Namespace declared in the classifier.
    pub fn classifier_namespace(&self) -> Result<&str, ClassifierError> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(ClassifierError::MissingClassifier)?;
        classifier
            .namespace
            .as_deref()
            .ok_or(ClassifierError::MissingNamespace)
    }

    /// Tenant the body asserts.
    ///
    /// With a classifier present only `classifier.tenantId` counts; the
    /// top-level `tenantId` is read only from classifier-less bodies.
    /// Empty strings count as absent.
    pub fn declared_tenant(&self) -> Option<&str> {
        match &self.classifier {
            Some(classifier) => classifier.tenant_id.as_deref(),
            None => self.tenant_id.as_deref(),
        }
        .filter(|t| !t.is_empty())
    }

    /// Attach the originating service tag for the aggregator.
    pub fn enrich_origin_service(&mut self, service_name: &str) {
        self.fields.insert(
            ORIGIN_SERVICE_FIELD.to_string(),
            Value::String(service_name.to_string()),
        );
    }

    /// Raw JSON field, for logging.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> RequestBody {
        RequestBody::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_body_has_no_classifier() {
        let body = RequestBody::parse(b"").unwrap();
        assert!(body.classifier().is_none());
        assert_eq!(body.service_name(), Err(ClassifierError::MissingClassifier));
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert!(matches!(
            RequestBody::parse(b"[1,2]"),
            Err(ClassifierError::MalformedBody(_))
        ));
        assert!(matches!(
            RequestBody::parse(b"{not json"),
            Err(ClassifierError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_classifier_must_be_object() {
        let result = RequestBody::from_value(json!({"classifier": "ns-1"}));
        assert!(matches!(
            result,
            Err(ClassifierError::MalformedClassifier(_))
        ));

        let result = RequestBody::from_value(json!({"classifier": {"namespace": 42}}));
        assert!(matches!(
            result,
            Err(ClassifierError::MalformedClassifier(_))
        ));
    }

    #[test]
    fn test_service_name() {
        let b = body(json!({"classifier": {"namespace": "ns-1"}}));
        assert_eq!(b.service_name(), Err(ClassifierError::MissingServiceName));

        let b = body(json!({"classifier": {"microserviceName": ""}}));
        assert_eq!(b.service_name(), Err(ClassifierError::MissingServiceName));

        let b = body(json!({"classifier": {"microserviceName": "orders", "scope": "service"}}));
        assert_eq!(b.service_name(), Ok("orders"));
    }

    #[test]
    fn test_classifier_namespace() {
        let b = body(json!({"classifier": {"microserviceName": "orders"}}));
        assert_eq!(
            b.classifier_namespace(),
            Err(ClassifierError::MissingNamespace)
        );

        let b = body(json!({"classifier": {"namespace": "ns-2"}}));
        assert_eq!(b.classifier_namespace(), Ok("ns-2"));
    }

    #[test]
    fn test_declared_tenant_prefers_classifier() {
        let b = body(json!({"classifier": {"tenantId": "t1"}, "tenantId": "t2"}));
        assert_eq!(b.declared_tenant(), Some("t1"));

        let b = body(json!({"classifier": {"namespace": "ns-1"}, "tenantId": "t2"}));
        assert_eq!(b.declared_tenant(), None);

        let b = body(json!({"tenantId": "t2"}));
        assert_eq!(b.declared_tenant(), Some("t2"));

        let b = body(json!({"classifier": {"tenantId": ""}}));
        assert_eq!(b.declared_tenant(), None);

        let b = body(json!({}));
        assert_eq!(b.declared_tenant(), None);
    }

    #[test]
    fn test_top_level_tenant_must_be_string() {
        assert!(matches!(
            RequestBody::from_value(json!({"tenantId": 7})),
            Err(ClassifierError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_enrichment_keeps_other_fields() {
        let mut b = body(json!({
            "classifier": {"microserviceName": "orders", "namespace": "ns-1", "custom": true},
            "type": "postgresql"
        }));
        b.enrich_origin_service("orders");

        let out: Value = serde_json::from_slice(&b.to_bytes().unwrap()).unwrap();
        assert_eq!(out["originService"], "orders");
        assert_eq!(out["type"], "postgresql");
        assert_eq!(out["classifier"]["custom"], true);
    }
}
