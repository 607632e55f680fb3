//! JSON pipeline manifests.
//!
//! ```json
//! {"steps": [{"op": "text.split", "args": [","]}, {"op": "seq.index", "args": [0]}]}
//! ```
//!
//! Operators taking host callbacks cannot appear in a manifest.

use std::path::Path;

use rope_types::{codes, ErrorKind, StepResult, StructuredError, Value};
use serde::{Deserialize, Serialize};

use crate::blueprint::Blueprint;
use crate::engine::ExecutorConfig;
use crate::ops::construct;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepManifest {
    /// Qualified operator name, `namespace.name`.
    pub op: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineManifest {
    #[serde(default)]
    pub config: ExecutorConfig,
    pub steps: Vec<StepManifest>,
}

impl PipelineManifest {
    pub fn from_json(text: &str) -> rope_types::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> rope_types::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Build the blueprint, failing on the first step that cannot be
    /// constructed. The failing step's position is recorded as `step`.
    pub fn to_blueprint(&self) -> StepResult<Blueprint> {
        self.steps
            .iter()
            .enumerate()
            .map(|(idx, step)| {
                let (namespace, name) = step.op.split_once('.').ok_or_else(|| {
                    StructuredError::new(
                        ErrorKind::InvalidInput,
                        codes::UNKNOWN_OPERATOR,
                        format!("Operator '{}' is not of the form namespace.name", step.op),
                    )
                })?;
                construct(namespace, name, &step.args).map_err(|e| e.with_meta("step", idx as i64))
            })
            .collect()
    }
}
