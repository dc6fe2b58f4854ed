//! IR serialization helpers.
//!
//! Serde already provides JSON serialization. This module centralizes the
//! helpers the engine and the command-line front end share, and keeps the
//! formatting stable.

use crate::error::{AlertError, ValidationError};
use crate::ir::operations::AlertRequest;

/// Serialize a request to pretty JSON.
pub fn to_json_pretty(request: &AlertRequest) -> Result<String, AlertError> {
    serde_json::to_string_pretty(request).map_err(|e| AlertError::internal(format!("serialize request: {e}")))
}

/// Deserialize a request from JSON.
///
/// Malformed JSON, unknown operations and payloads that fail type-level
/// checks (a zero station number, a bad birthdate) come back as
/// [`AlertError::Validation`]. Callers should then invoke
/// `request.validate()` before executing.
pub fn from_json(s: &str) -> Result<AlertRequest, AlertError> {
    serde_json::from_str::<AlertRequest>(s).map_err(|e| {
        AlertError::Validation(ValidationError::InvalidFormat {
            field: "request".to_string(),
            value: e.to_string(),
            expected: "a JSON alert request",
        })
    })
}

/// Deserialize a request, accepting either the full envelope or a bare
/// operation (`{"op": ..., "payload": ...}`), which is wrapped in a fresh
/// envelope.
pub fn from_json_lenient(s: &str) -> Result<AlertRequest, AlertError> {
    let value: serde_json::Value = serde_json::from_str(s).map_err(|e| {
        AlertError::Validation(ValidationError::InvalidFormat {
            field: "request".to_string(),
            value: e.to_string(),
            expected: "JSON",
        })
    })?;
    if value.get("operation").is_some() {
        return from_json(s);
    }
    let operation = serde_json::from_value(value).map_err(|e| {
        AlertError::Validation(ValidationError::InvalidFormat {
            field: "operation".to_string(),
            value: e.to_string(),
            expected: "an alert operation",
        })
    })?;
    Ok(AlertRequest::new(operation))
}
