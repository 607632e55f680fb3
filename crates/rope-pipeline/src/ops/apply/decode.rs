use rope_types::{codes, ErrorKind, StepResult, StructuredError, Value};

use super::expect_text;

pub(crate) fn json(value: Value) -> StepResult<Value> {
    let text = expect_text(value)?;
    json_text(&text)
}

/// Decode JSON straight from borrowed text into a [`Value`]. Shared by the
/// `decode.json` step and the engine's fast path, so both fail identically.
pub(crate) fn json_text(text: &str) -> StepResult<Value> {
    serde_json::from_str::<Value>(text).map_err(|e| {
        StructuredError::new(ErrorKind::InvalidInput, codes::DECODE_ERROR, "Failed to decode JSON")
            .with_meta("expected", "JSON text")
            .with_meta("line", e.line() as i64)
            .with_meta("column", e.column() as i64)
            .with_meta("reason", e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn decodes_nested_documents() {
        let out = json(Value::from(r#"{"a": [1, 2.5, "x", null, true]}"#)).unwrap();
        let expected = Value::Mapping(BTreeMap::from([(
            "a".to_string(),
            Value::Sequence(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Null,
                Value::Bool(true),
            ]),
        )]));
        assert_eq!(out, expected);
    }

    #[test]
    fn malformed_json_reports_position() {
        let err = json(Value::from("{\n  \"a\": }")).unwrap_err();
        assert_eq!(err.code, "decode_error");
        assert_eq!(err.meta("line"), Some(&Value::Int(2)));
    }

    #[test]
    fn oversized_integers_fail_to_decode() {
        let err = json_text("18446744073709551615").unwrap_err();
        assert_eq!(err.code, "decode_error");
    }

    #[test]
    fn json_requires_text() {
        assert_eq!(json(Value::Int(1)).unwrap_err().code, "type_mismatch");
    }
}
