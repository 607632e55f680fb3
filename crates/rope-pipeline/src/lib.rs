//! Blueprint interpreter, operators, and generated dispatch.
//!
//! A [`Blueprint`] is an ordered list of [`Operator`]s built with the
//! per-namespace constructors under [`op`]. [`run`] converts a host value,
//! executes the steps in order and stops at the first failure, returning a
//! [`StructuredError`](rope_types::StructuredError) that names the failing
//! operator.

pub mod blueprint;
pub mod engine;
pub mod host;
pub mod manifest;
pub mod ops;
pub mod validation;

pub use blueprint::{Blueprint, Operator};
pub use engine::{run, Executor, ExecutorConfig, FastPath};
pub use host::HostCallback;
pub use manifest::{PipelineManifest, StepManifest};
pub use ops::{construct, find_descriptor, op, OpDescriptor, OperatorKind, DESCRIPTORS, NAMESPACES};
pub use validation::{validate, validate_or_raise, Diagnostic, LintRule, Severity};
