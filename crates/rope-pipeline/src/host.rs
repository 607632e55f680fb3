//! Host callbacks for the escape-hatch operator.

use std::fmt;
use std::sync::Arc;

use rope_types::HostException;

type Callback = dyn Fn(serde_json::Value) -> Result<serde_json::Value, HostException> + Send + Sync;

/// A host function a blueprint can call from `core.map_host`.
///
/// Callbacks see and return host values. They signal failure by returning a
/// [`HostException`]; a panic is not caught and unwinds through the engine.
#[derive(Clone)]
pub struct HostCallback {
    name: String,
    func: Arc<Callback>,
}

impl HostCallback {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(serde_json::Value) -> Result<serde_json::Value, HostException> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, input: serde_json::Value) -> Result<serde_json::Value, HostException> {
        (self.func)(input)
    }
}

impl fmt::Debug for HostCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCallback").field("name", &self.name).finish_non_exhaustive()
    }
}
