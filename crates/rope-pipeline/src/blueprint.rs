//! Operator instances and the blueprints built from them.

use std::fmt;

use rope_types::{StepResult, Value};

use crate::engine::Executor;
use crate::ops::{OpDescriptor, OperatorKind};

/// An operator bound to its arguments. Immutable once built.
#[derive(Debug, Clone)]
pub struct Operator {
    kind: OperatorKind,
}

impl Operator {
    pub fn kind(&self) -> &OperatorKind {
        &self.kind
    }

    pub fn descriptor(&self) -> &'static OpDescriptor {
        self.kind.descriptor()
    }

    pub fn qualified_name(&self) -> String {
        self.descriptor().qualified_name()
    }
}

impl From<OperatorKind> for Operator {
    fn from(kind: OperatorKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptor = self.descriptor();
        write!(f, "{}.{}", descriptor.namespace, descriptor.external_name)
    }
}

/// An ordered, append-only sequence of operators.
///
/// ```
/// use rope_pipeline::{op, Blueprint};
/// use serde_json::json;
///
/// let upper_first = Blueprint::new()
///     .pipe(op::text::split(","))
///     .pipe(op::text::index(0))
///     .pipe(op::coerce::expect_str())
///     .pipe(op::text::to_uppercase());
/// assert_eq!(rope_pipeline::run(&upper_first, &json!("hello,world")), Ok(json!("HELLO")));
/// ```
///
/// Executing a blueprint never changes it, so one blueprint can be run any
/// number of times, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Blueprint {
    ops: Vec<Operator>,
}

impl Blueprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn pipe(mut self, op: impl Into<Operator>) -> Self {
        self.ops.push(op.into());
        self
    }

    /// Append a step that fails unless the current value is text.
    pub fn guard_str(self) -> Self {
        self.pipe(OperatorKind::AssertStr)
    }

    pub fn operators(&self) -> &[Operator] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Execute on an already-converted value with the default executor.
    pub fn run(&self, input: Value) -> StepResult<Value> {
        Executor::default().execute(self, input)
    }
}

impl FromIterator<Operator> for Blueprint {
    fn from_iter<I: IntoIterator<Item = Operator>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.ops.iter().map(|op| op.to_string()).collect();
        write!(f, "[{}]", names.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::op;

    #[test]
    fn pipe_appends_in_order() {
        let bp = Blueprint::new().pipe(op::text::split(",")).pipe(op::seq::index(1));
        assert_eq!(bp.len(), 2);
        assert_eq!(bp.to_string(), "[text.split | seq.index]");
    }

    #[test]
    fn alias_constructors_share_a_descriptor() {
        let via_text = Operator::from(op::text::index(0));
        let via_seq = Operator::from(op::seq::index(0));
        assert_eq!(via_text.descriptor(), via_seq.descriptor());
        assert_eq!(via_text.qualified_name(), "seq.index");
    }

    #[test]
    fn guard_str_appends_text_assertion() {
        let bp = Blueprint::new().guard_str();
        assert!(matches!(bp.operators()[0].kind(), OperatorKind::AssertStr));
    }

    #[test]
    fn empty_blueprint_returns_input() {
        let bp = Blueprint::new();
        assert!(bp.is_empty());
        assert_eq!(bp.run(Value::Int(7)), Ok(Value::Int(7)));
    }

    #[test]
    fn collect_into_blueprint() {
        let bp: Blueprint = [op::text::to_lowercase(), op::core::len()].into_iter().collect();
        assert_eq!(bp.to_string(), "[text.to_lowercase | core.len]");
    }
}
