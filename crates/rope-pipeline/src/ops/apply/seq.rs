use rope_types::{codes, ErrorKind, PathItem, StepResult, StructuredError, Value};

use super::expect_sequence;

/// Negative positions are out of range; there is no counting from the end.
pub(crate) fn index(value: Value, idx: i64) -> StepResult<Value> {
    let mut items = expect_sequence(value)?;
    let len = items.len();
    match usize::try_from(idx) {
        Ok(position) if position < len => Ok(items.swap_remove(position)),
        _ => Err(StructuredError::new(
            ErrorKind::NotFound,
            codes::INDEX_OUT_OF_RANGE,
            "Index out of range",
        )
        .with_meta("expected", format!("<{len}"))
        .with_meta("got", idx)
        .with_path(vec![PathItem::Index(idx)])),
    }
}
