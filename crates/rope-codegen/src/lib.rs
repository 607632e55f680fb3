//! Operator registry code generator.
//!
//! The annotated `OperatorKind` enum in `rope-pipeline` is the single source
//! of truth for every operator. This crate reads it and renders two
//! artifacts from it:
//! - the native dispatch module (`ops/generated.rs`)
//! - the typed stub surface (`stubs/ops.pyi`)
//!
//! ```
//! use rope_codegen::{parse_registry, Emitter, StubEmitter};
//!
//! let registry = parse_registry(r#"
//! /// @namespace text "Text operations."
//! pub enum OperatorKind {
//!     /// @op name=to_uppercase
//!     /// @sig in=str out=str
//!     /// @ns text
//!     ToUppercase,
//! }
//! "#).unwrap();
//! let stubs = StubEmitter.emit(&registry);
//! assert!(stubs.contains("def to_uppercase() -> Operator[str, str]: ..."));
//! ```

pub mod descriptor;
pub mod drift;
pub mod emit;
pub mod frontend;
pub mod signature;

pub use descriptor::{NamespaceDecl, OperatorDescriptor, ParamDescriptor, ParamType, Registry};
pub use drift::{
    check_drift, find_drift, generate, generate_from_source, verify, write_artifacts, Artifact,
    Layout,
};
pub use emit::{default_emitters, Emitter, NativeEmitter, StubEmitter};
pub use frontend::parse_registry;
pub use signature::{parse_type, TypeExpr};
