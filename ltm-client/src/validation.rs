//! Validation error documents returned with HTTP 422.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorItem {
    /// Path to the offending field; elements are names or list indices.
    pub loc: Vec<Value>,
    /// Human-readable message.
    pub msg: String,
    /// Machine-readable error type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Any further fields the service sent (`input`, `ctx`, `url`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Display for ValidationErrorItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .loc
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{path}: {}", self.msg)
    }
}

/// The body of a validation failure response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpValidationError {
    pub detail: Vec<ValidationErrorItem>,
}
