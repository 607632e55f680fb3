use rope_types::{exception_to_error, StepResult, StructuredError, Value};

use crate::host::HostCallback;

pub(crate) fn len(value: Value) -> StepResult<Value> {
    let count = match &value {
        Value::Text(text) => text.chars().count(),
        Value::Sequence(items) => items.len(),
        Value::Mapping(map) => map.len(),
        other => return Err(StructuredError::type_mismatch("str|list|map", other)),
    };
    Ok(Value::Int(count as i64))
}

/// Round-trips the value through the host. Only this step can produce a
/// `py_exception` failure.
pub(crate) fn map_host(value: Value, func: &HostCallback) -> StepResult<Value> {
    let output = func
        .call(value.to_host())
        .map_err(|exc| exception_to_error(&exc).with_meta("callback", func.name()))?;
    Value::from_host(&output).map_err(StructuredError::from)
}
