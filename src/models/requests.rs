//! Request bodies
//!
//! Create and patch bodies are flat JSON objects keyed by public field name.
//! They are parsed by hand so that every malformed body maps to a 400.

use serde_json::{Map, Value};

use crate::error::{ApiError, Result};

/// Parsed create or patch body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordInput {
    fields: Map<String, Value>,
}

impl RecordInput {
    /// Parses a raw request body into a field map.
    pub fn parse(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Err(ApiError::MalformedInput("Request body is empty".to_string()));
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::MalformedInput(format!("Invalid JSON body: {}", e)))?;

        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ApiError::MalformedInput(format!(
                "Expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for RecordInput {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Short JSON type name for messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object() {
        let input = RecordInput::parse(br#"{"role": "Officer"}"#).unwrap();
        assert_eq!(input.len(), 1);
        assert_eq!(input.get("role").and_then(Value::as_str), Some("Officer"));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let result = RecordInput::parse(br#"{"invalid json"#);
        assert!(matches!(result, Err(ApiError::MalformedInput(_))));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let result = RecordInput::parse(b"[1, 2]");
        assert!(matches!(result, Err(ApiError::MalformedInput(msg)) if msg.contains("array")));
    }

    #[test]
    fn test_parse_rejects_empty_body() {
        assert!(RecordInput::parse(b"").is_err());
    }
}
