//! Operator implementations, one module per primary namespace.
//!
//! Each function takes the input value by ownership plus the operator's
//! parameters and returns the next value or a [`StructuredError`]. They do
//! not know their own qualified name; the engine stamps `op` on failures.

pub(crate) mod coerce;
pub(crate) mod core;
pub(crate) mod decode;
pub(crate) mod map;
pub(crate) mod seq;
pub(crate) mod text;

use std::collections::BTreeMap;

use rope_types::{StepResult, StructuredError, Value};

fn expect_text(value: Value) -> StepResult<String> {
    match value {
        Value::Text(text) => Ok(text),
        other => Err(StructuredError::type_mismatch("str", &other)),
    }
}

fn expect_sequence(value: Value) -> StepResult<Vec<Value>> {
    match value {
        Value::Sequence(items) => Ok(items),
        other => Err(StructuredError::type_mismatch("list", &other)),
    }
}

fn expect_mapping(value: Value) -> StepResult<BTreeMap<String, Value>> {
    match value {
        Value::Mapping(map) => Ok(map),
        other => Err(StructuredError::type_mismatch("map", &other)),
    }
}
