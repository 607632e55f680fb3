//! Argument checking for dynamic construction (`construct`).

use rope_types::{codes, ErrorKind, StepResult, StructuredError, Value};

/// A plain operator parameter that can be read from a [`Value`].
pub(crate) trait FromArg: Sized {
    const EXPECTED: &'static str;

    fn from_arg(value: &Value) -> Option<Self>;
}

impl FromArg for String {
    const EXPECTED: &'static str = "str";

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromArg for i64 {
    const EXPECTED: &'static str = "int";

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromArg for f64 {
    const EXPECTED: &'static str = "float";

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromArg for bool {
    const EXPECTED: &'static str = "bool";

    fn from_arg(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

pub(crate) fn param<T: FromArg>(params: &[Value], index: usize, name: &str) -> StepResult<T> {
    let value = params.get(index);
    value.and_then(T::from_arg).ok_or_else(|| {
        StructuredError::new(
            ErrorKind::InvalidInput,
            codes::INVALID_ARGUMENT,
            format!("Invalid value for parameter '{name}'"),
        )
        .with_meta("param", name)
        .with_meta("expected", T::EXPECTED)
        .with_meta("got", value.map_or("missing", Value::type_name))
    })
}

pub(crate) fn arity(namespace: &str, name: &str, params: &[Value], expected: usize) -> StepResult<()> {
    if params.len() == expected {
        return Ok(());
    }
    Err(StructuredError::new(
        ErrorKind::InvalidInput,
        codes::ARITY_MISMATCH,
        format!("{namespace}.{name} takes {expected} argument(s)"),
    )
    .with_meta("expected", expected as i64)
    .with_meta("got", params.len() as i64))
}

pub(crate) fn unknown_operator(namespace: &str, name: &str) -> StructuredError {
    StructuredError::new(
        ErrorKind::NotFound,
        codes::UNKNOWN_OPERATOR,
        format!("Unknown operator '{namespace}.{name}'"),
    )
}

pub(crate) fn not_constructible(namespace: &str, name: &str) -> StructuredError {
    StructuredError::new(
        ErrorKind::InvalidInput,
        codes::NOT_CONSTRUCTIBLE,
        format!("{namespace}.{name} takes a host callback and cannot be built from plain values"),
    )
}
