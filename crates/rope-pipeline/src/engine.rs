//! Blueprint interpreter: runs the steps in order and stops at the first
//! failure.

use rope_types::{StepResult, StructuredError, Value};
use serde::{Deserialize, Serialize};

use crate::blueprint::{Blueprint, Operator};
use crate::ops::{dispatch, json_text, OperatorKind};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Whether a leading `decode.json` may parse host text directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FastPath {
    #[default]
    Auto,
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default)]
    pub fast_path: FastPath,
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Stateless interpreter. All running state lives on the stack of one
/// `run`/`execute` call.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: ExecutorConfig,
}

impl Executor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Every step runs through the generic conversion boundary.
    pub fn without_fast_path() -> Self {
        Self::new(ExecutorConfig {
            fast_path: FastPath::Disabled,
        })
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Convert `input` from host form, run `blueprint`, and convert the
    /// result back.
    pub fn run(&self, blueprint: &Blueprint, input: &serde_json::Value) -> StepResult<serde_json::Value> {
        let ops = blueprint.operators();
        let (start, rest) = match (self.config.fast_path, ops.first(), input) {
            (FastPath::Auto, Some(first), serde_json::Value::String(text))
                if matches!(first.kind(), OperatorKind::JsonDecode) =>
            {
                tracing::debug!(steps = ops.len(), "Decoding input on the fast path");
                let decoded = json_text(text).map_err(|e| e.in_op(&first.qualified_name()))?;
                (decoded, &ops[1..])
            }
            _ => {
                let value = Value::from_host(input)
                    .map_err(|e| StructuredError::from(e).with_op("input"))?;
                (value, ops)
            }
        };
        run_steps(rest, start).map(|value| value.to_host())
    }

    /// Run `blueprint` on an already-converted value.
    pub fn execute(&self, blueprint: &Blueprint, input: Value) -> StepResult<Value> {
        run_steps(blueprint.operators(), input)
    }
}

fn run_steps(ops: &[Operator], input: Value) -> StepResult<Value> {
    let mut current = input;
    for (step, op) in ops.iter().enumerate() {
        tracing::debug!(step, op = %op, "Dispatching step");
        current = dispatch(op.kind(), current).map_err(|e| {
            let name = op.qualified_name();
            tracing::debug!(step, op = %name, code = %e.code, "Step failed; short-circuiting");
            e.in_op(&name)
        })?;
    }
    Ok(current)
}

/// Run `blueprint` on a host value with the default configuration.
pub fn run(blueprint: &Blueprint, input: &serde_json::Value) -> StepResult<serde_json::Value> {
    Executor::default().run(blueprint, input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::op;
    use serde_json::json;

    #[test]
    fn scenario_split_index_upper() {
        let bp = Blueprint::new()
            .pipe(op::text::split(","))
            .pipe(op::text::index(0))
            .pipe(op::coerce::expect_str())
            .pipe(op::text::to_uppercase());
        assert_eq!(run(&bp, &json!("hello,world")), Ok(json!("HELLO")));
    }

    #[test]
    fn failure_records_the_operator() {
        let bp = Blueprint::new().pipe(op::seq::index(5));
        let err = run(&bp, &json!(["a", "b"])).unwrap_err();
        assert_eq!(err.code, "index_out_of_range");
        assert_eq!(err.op.as_deref(), Some("seq.index"));
    }

    #[test]
    fn unconvertible_input_fails_before_any_step() {
        let bp = Blueprint::new().pipe(op::core::len());
        let err = run(&bp, &json!(u64::MAX)).unwrap_err();
        assert_eq!(err.code, "unsupported_type");
        assert_eq!(err.op.as_deref(), Some("input"));
    }

    #[test]
    fn fast_path_and_generic_path_agree_on_errors() {
        let bp = Blueprint::new().pipe(op::decode::json()).pipe(op::map::get("a"));
        let input = json!("{\"a\": ");
        let fast = Executor::default().run(&bp, &input);
        let slow = Executor::without_fast_path().run(&bp, &input);
        assert_eq!(fast, slow);
        assert_eq!(fast.unwrap_err().op.as_deref(), Some("decode.json"));
    }

    #[test]
    fn fast_path_skipped_for_non_text_input() {
        let bp = Blueprint::new().pipe(op::decode::json());
        let err = run(&bp, &json!(3)).unwrap_err();
        assert_eq!(err.code, "type_mismatch");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ExecutorConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.fast_path, FastPath::Auto);
        let config: ExecutorConfig = serde_json::from_value(json!({"fast_path": "disabled"})).unwrap();
        assert_eq!(config.fast_path, FastPath::Disabled);
    }
}
