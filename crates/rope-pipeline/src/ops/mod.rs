//! Operators: the annotated registry, its generated dispatch, and the
//! implementations behind it.

mod apply;
mod args;
pub mod descriptor;
pub mod generated;
pub mod kind;

pub use descriptor::OpDescriptor;
pub use generated::{construct, op, DESCRIPTORS, NAMESPACES};
pub use kind::OperatorKind;

pub(crate) use apply::decode::json_text;
pub(crate) use generated::dispatch;

/// Look up an operator by namespace and external name, aliases included.
pub fn find_descriptor(namespace: &str, name: &str) -> Option<&'static OpDescriptor> {
    DESCRIPTORS.iter().find(|d| {
        d.external_name == name && (d.namespace == namespace || d.aliases.contains(&namespace))
    })
}
