use rope_types::{codes, ErrorKind, StepResult, StructuredError, Value};

use super::expect_text;

/// The delimiter is checked before the input type.
pub(crate) fn split(value: Value, delim: &str) -> StepResult<Value> {
    if delim.is_empty() {
        return Err(StructuredError::new(
            ErrorKind::InvalidInput,
            codes::INVALID_DELIM,
            "Split delimiter must not be empty",
        )
        .with_meta("expected", "non-empty string")
        .with_meta("got", "empty string"));
    }
    let text = expect_text(value)?;
    Ok(Value::Sequence(
        text.split(delim).map(Value::from).collect(),
    ))
}

pub(crate) fn to_uppercase(value: Value) -> StepResult<Value> {
    expect_text(value).map(|text| Value::Text(text.to_uppercase()))
}

pub(crate) fn to_lowercase(value: Value) -> StepResult<Value> {
    expect_text(value).map(|text| Value::Text(text.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_empty_parts() {
        let out = split(Value::from("a,,b"), ",").unwrap();
        assert_eq!(
            out,
            Value::Sequence(vec![Value::from("a"), Value::from(""), Value::from("b")])
        );
    }

    #[test]
    fn empty_delimiter_wins_over_type_mismatch() {
        let err = split(Value::Int(3), "").unwrap_err();
        assert_eq!(err.code, "invalid_delim");
    }

    #[test]
    fn case_mapping() {
        assert_eq!(to_uppercase(Value::from("straße")).unwrap(), Value::from("STRASSE"));
        assert_eq!(to_lowercase(Value::from("ABC")).unwrap(), Value::from("abc"));
        assert_eq!(to_lowercase(Value::Null).unwrap_err().code, "type_mismatch");
    }
}
