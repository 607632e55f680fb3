use chrono::{NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use rope_types::{codes, ErrorKind, StepResult, StructuredError, Value};

use super::expect_text;

fn parse_error(message: &str, expected: &str, got: impl Into<Value>) -> StructuredError {
    StructuredError::new(ErrorKind::InvalidInput, codes::PARSE_ERROR, message)
        .with_meta("expected", expected)
        .with_meta("got", got)
}

pub(crate) fn assert_str(value: Value) -> StepResult<Value> {
    expect_text(value).map(Value::Text)
}

pub(crate) fn expect_str(value: Value) -> StepResult<Value> {
    expect_text(value).map(Value::Text)
}

pub(crate) fn as_int(value: Value) -> StepResult<Value> {
    match value {
        Value::Int(n) => Ok(Value::Int(n)),
        Value::Float(f) if f.is_finite() => {
            let truncated = f.trunc();
            // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
            if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
                Ok(Value::Int(truncated as i64))
            } else {
                Err(parse_error("Float is out of range for int", "int", f.to_string()))
            }
        }
        Value::Float(f) => Err(parse_error(
            "Failed to convert float to int",
            "finite float",
            f.to_string(),
        )),
        Value::Bool(b) => Ok(Value::Int(i64::from(b))),
        Value::Text(s) => match s.trim().parse::<i64>() {
            Ok(n) => Ok(Value::Int(n)),
            Err(_) => Err(parse_error("Failed to parse as int", "integer string", s)),
        },
        other => Err(StructuredError::type_mismatch("str|int|float|bool", &other)),
    }
}

pub(crate) fn as_float(value: Value) -> StepResult<Value> {
    match value {
        Value::Float(f) => Ok(Value::Float(f)),
        Value::Int(n) => Ok(Value::Float(n as f64)),
        Value::Text(s) => match s.trim().parse::<f64>() {
            Ok(f) => Ok(Value::Float(f)),
            Err(_) => Err(parse_error("Failed to parse as float", "numeric string", s)),
        },
        other => Err(StructuredError::type_mismatch("str|int|float", &other)),
    }
}

pub(crate) fn as_bool(value: Value) -> StepResult<Value> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(b)),
        Value::Int(n) => Ok(Value::Bool(n != 0)),
        Value::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" | "" => Ok(Value::Bool(false)),
            _ => Err(parse_error(
                "Failed to parse as bool",
                "true/false/1/0/yes/no/on/off",
                s,
            )),
        },
        other => Err(StructuredError::type_mismatch("str|int|bool", &other)),
    }
}

/// A datetime, or a bare date at midnight; the result is always UTC.
pub(crate) fn as_datetime(value: Value, format: &str) -> StepResult<Value> {
    let text = match value {
        Value::Text(text) => text,
        other => return Err(StructuredError::type_mismatch("str", &other)),
    };
    let trimmed = text.trim();
    let naive = NaiveDateTime::parse_from_str(trimmed, format).or_else(|_| {
        NaiveDate::parse_from_str(trimmed, format).map(|date| date.and_time(NaiveTime::MIN))
    });
    match naive {
        Ok(naive) => Ok(Value::Text(
            Utc.from_utc_datetime(&naive)
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        )),
        Err(_) => Err(parse_error(
            "Failed to parse as datetime",
            "datetime string matching format",
            text,
        )
        .with_meta("format", format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(result: StepResult<Value>) -> String {
        result.unwrap_err().code
    }

    #[test]
    fn assert_str_accepts_only_text() {
        assert_eq!(assert_str(Value::from("a")).unwrap(), Value::from("a"));
        let err = assert_str(Value::Int(1)).unwrap_err();
        assert_eq!(err.code, "type_mismatch");
        assert_eq!(err.meta("expected"), Some(&Value::from("str")));
        assert_eq!(err.meta("got"), Some(&Value::from("int")));
    }

    #[test]
    fn as_int_coercions() {
        assert_eq!(as_int(Value::from(" 42 ")).unwrap(), Value::Int(42));
        assert_eq!(as_int(Value::Float(-3.9)).unwrap(), Value::Int(-3));
        assert_eq!(as_int(Value::Bool(true)).unwrap(), Value::Int(1));
        assert_eq!(code(as_int(Value::from("4x"))), "parse_error");
        assert_eq!(code(as_int(Value::Float(f64::NAN))), "parse_error");
        assert_eq!(code(as_int(Value::Null)), "type_mismatch");
    }

    #[test]
    fn as_int_rejects_floats_beyond_i64() {
        for f in [1e300, -1e19, 9_223_372_036_854_775_808.0] {
            let err = as_int(Value::Float(f)).unwrap_err();
            assert_eq!(err.code, "parse_error", "{f}");
            assert_eq!(err.meta("expected"), Some(&Value::from("int")));
            assert_eq!(err.meta("got"), Some(&Value::from(f.to_string())));
        }
        assert_eq!(
            as_int(Value::Float(-9_223_372_036_854_775_808.0)).unwrap(),
            Value::Int(i64::MIN)
        );
    }

    #[test]
    fn as_float_coercions() {
        assert_eq!(as_float(Value::Int(2)).unwrap(), Value::Float(2.0));
        assert_eq!(as_float(Value::from("1.5")).unwrap(), Value::Float(1.5));
        assert_eq!(code(as_float(Value::Bool(true))), "type_mismatch");
    }

    #[test]
    fn as_bool_words() {
        for word in ["true", "YES", " on ", "1"] {
            assert_eq!(as_bool(Value::from(word)).unwrap(), Value::Bool(true), "{word}");
        }
        for word in ["false", "No", "off", "0", ""] {
            assert_eq!(as_bool(Value::from(word)).unwrap(), Value::Bool(false), "{word}");
        }
        assert_eq!(as_bool(Value::Int(-2)).unwrap(), Value::Bool(true));
        assert_eq!(code(as_bool(Value::from("maybe"))), "parse_error");
    }

    #[test]
    fn as_datetime_formats() {
        let dt = as_datetime(Value::from("2024-03-01 12:30:00"), "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(dt, Value::from("2024-03-01T12:30:00Z"));
        let date = as_datetime(Value::from("2024-03-01"), "%Y-%m-%d").unwrap();
        assert_eq!(date, Value::from("2024-03-01T00:00:00Z"));
        let err = as_datetime(Value::from("yesterday"), "%Y-%m-%d").unwrap_err();
        assert_eq!(err.code, "parse_error");
        assert_eq!(err.meta("format"), Some(&Value::from("%Y-%m-%d")));
    }
}
