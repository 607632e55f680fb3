use super::{camel_case, Emitter, Source, HEADER, HEADER_VERIFY};
use crate::descriptor::{OperatorDescriptor, Registry};

/// Renders the typed surface (`stubs/ops.pyi`) that type checkers use to
/// follow `Operator[in, out]` through a blueprint.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubEmitter;

impl Emitter for StubEmitter {
    fn name(&self) -> &'static str {
        "stubs"
    }

    fn relative_path(&self) -> &'static str {
        crate::drift::Layout::STUBS
    }

    fn emit(&self, registry: &Registry) -> String {
        let mut src = Source::new();
        src.line(format!("# {HEADER}"));
        src.line(format!("# {HEADER_VERIFY}"));
        src.blank();
        src.line("from collections.abc import Callable, Mapping, Sequence");
        src.line("from typing import final");
        src.blank();
        src.line("from ._native import Operator");

        let mut exported = Vec::new();
        for ns in &registry.namespaces {
            let class = format!("{}Ops", camel_case(&ns.name));
            src.blank();
            src.blank();
            src.line("@final");
            src.line(format!("class {class}:"));
            src.indent();
            src.line(docstring(&ns.description));
            for op in registry.exported_in(&ns.name) {
                src.blank();
                emit_method(&mut src, op);
            }
            src.dedent();
            exported.push(class);
        }

        src.blank();
        src.blank();
        src.line("@final");
        src.line("class Op:");
        src.indent();
        src.line("\"\"\"Operator namespaces: `Op.text.split(\",\")`.\"\"\"");
        src.blank();
        for ns in &registry.namespaces {
            src.line(format!("{}: {}Ops", ns.name, camel_case(&ns.name)));
        }
        src.dedent();
        exported.push("Op".to_string());

        let quoted: Vec<String> = exported.iter().map(|name| format!("\"{name}\"")).collect();
        src.blank();
        src.blank();
        src.line(format!("__all__ = [{}]", quoted.join(", ")));
        src.finish()
    }
}

/// A one-line Python docstring. Quotes and backslashes are escaped so prose
/// ending in `"` cannot close the literal early.
fn docstring(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"\"\"{escaped}\"\"\"")
}

fn emit_method(src: &mut Source, op: &OperatorDescriptor) {
    let params: Vec<String> = op
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty.stub_type()))
        .collect();
    let signature = format!(
        "def {}({}) -> Operator[{}, {}]:",
        op.external_name,
        params.join(", "),
        op.input,
        op.output
    );
    src.line("@staticmethod");
    match &op.doc {
        Some(doc) => {
            src.line(signature);
            src.indent();
            src.line(docstring(doc));
            src.line("...");
            src.dedent();
        }
        None => src.line(format!("{signature} ...")),
    }
}
