//! Error types for record detection

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Top-level kind of a JSON value, reported when a document has no usable shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Boolean,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JsonKind::Null => "null",
            JsonKind::Boolean => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while locating records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The document is not an array of objects, a `data` envelope, or an object
    #[error("Unrecognized JSON shape: top-level {0} is not an array of objects, a `data` envelope, or an object")]
    UnrecognizedShape(JsonKind),

    /// A record-path override pointed at nothing
    #[error("Record path `{0}` does not exist in the document")]
    RecordPathNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_of_each_variant() {
        assert_eq!(JsonKind::of(&json!(null)), JsonKind::Null);
        assert_eq!(JsonKind::of(&json!(true)), JsonKind::Boolean);
        assert_eq!(JsonKind::of(&json!(1.5)), JsonKind::Number);
        assert_eq!(JsonKind::of(&json!("x")), JsonKind::String);
        assert_eq!(JsonKind::of(&json!([])), JsonKind::Array);
        assert_eq!(JsonKind::of(&json!({})), JsonKind::Object);
    }

    #[test]
    fn test_error_message_names_kind() {
        let err = ExtractError::UnrecognizedShape(JsonKind::String);
        assert!(err.to_string().contains("top-level string"));
    }
}
