//! The uniform failure payload carried by every pipeline step.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{ConversionError, Value};

/// A convenience alias for `Result<T, StructuredError>`.
pub type StepResult<T> = std::result::Result<T, StructuredError>;

/// Stable error codes. Callers branch on these; messages may change.
pub mod codes {
    pub const TYPE_MISMATCH: &str = "type_mismatch";
    pub const INDEX_OUT_OF_RANGE: &str = "index_out_of_range";
    pub const KEY_NOT_FOUND: &str = "key_not_found";
    pub const INVALID_DELIM: &str = "invalid_delim";
    pub const PARSE_ERROR: &str = "parse_error";
    pub const DECODE_ERROR: &str = "decode_error";
    pub const CONTEXT: &str = "context";
    pub const UNKNOWN_OPERATOR: &str = "unknown_operator";
    pub const ARITY_MISMATCH: &str = "arity_mismatch";
    pub const INVALID_ARGUMENT: &str = "invalid_argument";
    pub const NOT_CONSTRUCTIBLE: &str = "not_constructible";
    /// Bridged host exception. Only the escape-hatch step produces it.
    pub const PY_EXCEPTION: &str = "py_exception";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of the location recorded under `metadata.path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathItem {
    Key(String),
    Index(i64),
}

impl From<PathItem> for Value {
    fn from(item: PathItem) -> Self {
        match item {
            PathItem::Key(k) => Value::Text(k),
            PathItem::Index(i) => Value::Int(i),
        }
    }
}

/// Failure payload: a stable `code`, a human `message`, and an open
/// `metadata` bag (`path`, `expected`, `got`, `py_traceback`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct StructuredError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub metadata: BTreeMap<String, Value>,
    /// Qualified name (`ns.name`) of the operator that failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[source]
    pub cause: Option<Box<StructuredError>>,
}

impl StructuredError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            metadata: BTreeMap::new(),
            op: None,
            cause: None,
        }
    }

    /// The runtime value's variant does not match what the step accepts.
    pub fn type_mismatch(expected: impl Into<String>, got: &Value) -> Self {
        Self::new(ErrorKind::InvalidInput, codes::TYPE_MISMATCH, "Type mismatch")
            .with_meta("expected", Value::Text(expected.into()))
            .with_meta("got", got.type_name())
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Set `op` unless a more specific operator was already recorded.
    pub fn in_op(mut self, op: &str) -> Self {
        if self.op.is_none() {
            self.op = Some(op.to_string());
        }
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_path(self, path: Vec<PathItem>) -> Self {
        let items: Vec<Value> = path.into_iter().map(Value::from).collect();
        self.with_meta("path", items)
    }

    pub fn with_cause(mut self, cause: StructuredError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }
}

impl From<ConversionError> for StructuredError {
    fn from(err: ConversionError) -> Self {
        StructuredError::new(ErrorKind::InvalidInput, err.code, err.message)
            .with_meta("expected", err.expected)
            .with_meta("got", err.got)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_code_and_message() {
        let err = StructuredError::new(ErrorKind::NotFound, "key_not_found", "Key not found");
        assert_eq!(err.to_string(), "key_not_found: Key not found");
    }

    #[test]
    fn type_mismatch_records_expected_and_got() {
        let err = StructuredError::type_mismatch("str", &Value::Int(3));
        assert_eq!(err.code, codes::TYPE_MISMATCH);
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(err.meta("expected"), Some(&Value::from("str")));
        assert_eq!(err.meta("got"), Some(&Value::from("int")));
    }

    #[test]
    fn path_items_become_a_sequence() {
        let err = StructuredError::new(ErrorKind::NotFound, "index_out_of_range", "Index out of range")
            .with_path(vec![PathItem::Key("users".into()), PathItem::Index(4)]);
        assert_eq!(
            err.meta("path"),
            Some(&Value::Sequence(vec![Value::from("users"), Value::Int(4)]))
        );
    }

    #[test]
    fn in_op_keeps_existing_operator() {
        let err = StructuredError::new(ErrorKind::Internal, "x", "y").with_op("core.map_host");
        assert_eq!(err.in_op("text.split").op.as_deref(), Some("core.map_host"));
        let bare = StructuredError::new(ErrorKind::Internal, "x", "y");
        assert_eq!(bare.in_op("text.split").op.as_deref(), Some("text.split"));
    }

    #[test]
    fn conversion_error_maps_to_invalid_input() {
        let conv = ConversionError {
            code: "unsupported_type",
            message: "nope".into(),
            expected: "int".into(),
            got: "99999999999999999999".into(),
        };
        let err: StructuredError = conv.into();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert_eq!(err.code, "unsupported_type");
        assert_eq!(err.meta("got"), Some(&Value::from("99999999999999999999")));
    }

    #[test]
    fn serializes_without_empty_optionals() {
        let err = StructuredError::new(ErrorKind::InvalidInput, "parse_error", "bad");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "InvalidInput");
        assert!(json.get("op").is_none());
        assert!(json.get("cause").is_none());
    }
}
