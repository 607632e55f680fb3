use serde::Serialize;

/// Static registry metadata for one operator, as emitted into
/// `generated.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpDescriptor {
    pub internal_name: &'static str,
    pub external_name: &'static str,
    pub namespace: &'static str,
    pub aliases: &'static [&'static str],
    pub input: &'static str,
    pub output: &'static str,
    /// `(name, type)` pairs in declaration order.
    pub params: &'static [(&'static str, &'static str)],
    pub escape: bool,
}

impl OpDescriptor {
    /// `namespace.external_name`, the name used in error reports.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.external_name)
    }

    pub fn signature(&self) -> String {
        format!("{} -> {}", self.input, self.output)
    }
}
