use rope_types::{codes, ErrorKind, PathItem, StepResult, StructuredError, Value};

use super::expect_mapping;

pub(crate) fn get(value: Value, key: &str) -> StepResult<Value> {
    let mut map = expect_mapping(value)?;
    map.remove(key).ok_or_else(|| {
        StructuredError::new(ErrorKind::NotFound, codes::KEY_NOT_FOUND, "Key not found")
            .with_path(vec![PathItem::Key(key.to_string())])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn get_present_and_missing() {
        let map = Value::Mapping(BTreeMap::from([("name".to_string(), Value::from("rope"))]));
        assert_eq!(get(map.clone(), "name").unwrap(), Value::from("rope"));
        let err = get(map, "email").unwrap_err();
        assert_eq!(err.code, "key_not_found");
        assert_eq!(err.meta("path"), Some(&Value::Sequence(vec![Value::from("email")])));
    }
}
