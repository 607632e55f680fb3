use super::{Emitter, Source, HEADER, HEADER_VERIFY};
use crate::descriptor::{NamespaceDecl, OperatorDescriptor, Registry};

/// Renders `ops/generated.rs`: descriptor table, dispatch, dynamic
/// construction and one constructor module per namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEmitter;

impl Emitter for NativeEmitter {
    fn name(&self) -> &'static str {
        "native"
    }

    fn relative_path(&self) -> &'static str {
        crate::drift::Layout::NATIVE
    }

    fn emit(&self, registry: &Registry) -> String {
        let mut src = Source::new();
        src.line(format!("// {HEADER}"));
        src.line(format!("// {HEADER_VERIFY}"));
        src.blank();
        src.line("use rope_types::{StepResult, Value};");
        src.blank();
        src.line("use super::apply;");
        src.line("use super::args;");
        src.line("use super::descriptor::OpDescriptor;");
        src.line("use super::kind::OperatorKind;");
        src.line("use crate::blueprint::Operator;");
        if registry.has_callable_params() {
            src.line("use crate::host::HostCallback;");
        }

        emit_namespaces(&mut src, registry);
        emit_descriptors(&mut src, registry);
        emit_descriptor_lookup(&mut src, registry);
        emit_dispatch(&mut src, registry);
        emit_construct(&mut src, registry);
        for ns in &registry.namespaces {
            emit_namespace_module(&mut src, registry, ns);
        }
        emit_op_module(&mut src, registry);
        src.finish()
    }
}

/// `Name` or `Name { .. }`, for match patterns that ignore fields.
fn ignoring_pattern(op: &OperatorDescriptor) -> String {
    if op.params.is_empty() {
        format!("OperatorKind::{}", op.internal_name)
    } else {
        format!("OperatorKind::{} {{ .. }}", op.internal_name)
    }
}

fn binding_pattern(op: &OperatorDescriptor) -> String {
    if op.params.is_empty() {
        format!("OperatorKind::{}", op.internal_name)
    } else {
        let fields: Vec<&str> = op.params.iter().map(|p| p.name.as_str()).collect();
        format!("OperatorKind::{} {{ {} }}", op.internal_name, fields.join(", "))
    }
}

/// Widest field list rustfmt keeps on one line inside a struct literal.
const STRUCT_LIT_WIDTH: usize = 18;
const MAX_WIDTH: usize = 100;

/// `{open}OperatorKind::Variant { fields }.into(){close}`, laid out the way
/// rustfmt lays it out so that formatting the workspace leaves the artifact
/// untouched.
fn struct_literal_into(
    src: &mut Source,
    open: &str,
    variant: &str,
    fields: &[String],
    close: &str,
) {
    let joined = fields.join(", ");
    let single = format!("{open}OperatorKind::{variant} {{ {joined} }}.into(){close}");
    if joined.len() <= STRUCT_LIT_WIDTH && src.width() + single.len() <= MAX_WIDTH {
        src.line(single);
        return;
    }
    src.line(format!("{open}OperatorKind::{variant} {{"));
    src.indent();
    for field in fields {
        src.line(format!("{field},"));
    }
    src.dedent();
    src.line("}");
    src.line(format!(".into(){close}"));
}

/// Builds the variant with the given field expressions and converts it into
/// an `Operator`.
fn variant_into(src: &mut Source, op: &OperatorDescriptor, values: &[String]) {
    if op.params.is_empty() {
        src.line(format!("OperatorKind::{}.into()", op.internal_name));
        return;
    }
    let fields: Vec<String> = op
        .params
        .iter()
        .zip(values)
        .map(|(param, value)| {
            if *value == param.name {
                value.clone()
            } else {
                format!("{}: {value}", param.name)
            }
        })
        .collect();
    struct_literal_into(src, "", &op.internal_name, &fields, "");
}

fn emit_namespaces(src: &mut Source, registry: &Registry) {
    let names: Vec<String> = registry
        .namespaces
        .iter()
        .map(|ns| format!("{:?}", ns.name))
        .collect();
    src.blank();
    src.line("/// Declared namespaces, in registry order.");
    src.line(format!("pub const NAMESPACES: &[&str] = &[{}];", names.join(", ")));
}

fn emit_descriptors(src: &mut Source, registry: &Registry) {
    src.blank();
    src.line("/// One entry per operator, in registry order.");
    src.line("pub static DESCRIPTORS: &[OpDescriptor] = &[");
    src.indent();
    for op in &registry.operators {
        let aliases: Vec<String> = op.aliases.iter().map(|a| format!("{a:?}")).collect();
        let params: Vec<String> = op
            .params
            .iter()
            .map(|p| format!("({:?}, {:?})", p.name, p.ty.as_tag()))
            .collect();
        src.line("OpDescriptor {");
        src.indent();
        src.line(format!("internal_name: {:?},", op.internal_name));
        src.line(format!("external_name: {:?},", op.external_name));
        src.line(format!("namespace: {:?},", op.namespace));
        src.line(format!("aliases: &[{}],", aliases.join(", ")));
        src.line(format!("input: {:?},", op.input.to_string()));
        src.line(format!("output: {:?},", op.output.to_string()));
        src.line(format!("params: &[{}],", params.join(", ")));
        src.line(format!("escape: {},", op.escape));
        src.dedent();
        src.line("},");
    }
    src.dedent();
    src.line("];");
}

fn emit_descriptor_lookup(src: &mut Source, registry: &Registry) {
    src.blank();
    src.line("impl OperatorKind {");
    src.indent();
    src.line("/// Registry metadata for this operator.");
    src.line("pub fn descriptor(&self) -> &'static OpDescriptor {");
    src.indent();
    src.line("match self {");
    src.indent();
    for (idx, op) in registry.operators.iter().enumerate() {
        src.line(format!("{} => &DESCRIPTORS[{idx}],", ignoring_pattern(op)));
    }
    src.dedent();
    src.line("}");
    src.dedent();
    src.line("}");
    src.dedent();
    src.line("}");
}

fn emit_dispatch(src: &mut Source, registry: &Registry) {
    src.blank();
    src.line("/// Run one operator on `value`.");
    src.line("pub(crate) fn dispatch(op: &OperatorKind, value: Value) -> StepResult<Value> {");
    src.indent();
    src.line("match op {");
    src.indent();
    for op in &registry.operators {
        let mut call_args = vec!["value".to_string()];
        call_args.extend(op.params.iter().map(|p| p.ty.dispatch_arg(&p.name)));
        src.line(format!(
            "{} => apply::{}::{}({}),",
            binding_pattern(op),
            op.namespace,
            op.external_name,
            call_args.join(", ")
        ));
    }
    src.dedent();
    src.line("}");
    src.dedent();
    src.line("}");
}

fn emit_construct(src: &mut Source, registry: &Registry) {
    src.blank();
    src.line("/// Build an operator from its namespace, external name and plain");
    src.line("/// argument values.");
    src.line("pub fn construct(namespace: &str, name: &str, params: &[Value]) -> StepResult<Operator> {");
    src.indent();
    src.line("match (namespace, name) {");
    src.indent();
    for op in &registry.operators {
        let patterns: Vec<String> = op
            .namespaces()
            .map(|ns| format!("({ns:?}, {:?})", op.external_name))
            .collect();
        let patterns = patterns.join(" | ");
        if !op.is_constructible() {
            src.line(format!(
                "{patterns} => Err(args::not_constructible(namespace, name)),"
            ));
            continue;
        }
        src.line(format!("{patterns} => {{"));
        src.indent();
        src.line(format!(
            "args::arity(namespace, name, params, {})?;",
            op.params.len()
        ));
        if op.params.is_empty() {
            src.line(format!("Ok(OperatorKind::{}.into())", op.internal_name));
        } else {
            let fields: Vec<String> = op
                .params
                .iter()
                .enumerate()
                .map(|(idx, param)| {
                    let name = &param.name;
                    format!("{name}: args::param(params, {idx}, {name:?})?")
                })
                .collect();
            struct_literal_into(src, "Ok(", &op.internal_name, &fields, ")");
        }
        src.dedent();
        src.line("}");
    }
    src.line("_ => Err(args::unknown_operator(namespace, name)),");
    src.dedent();
    src.line("}");
    src.dedent();
    src.line("}");
}

fn emit_namespace_module(src: &mut Source, registry: &Registry, ns: &NamespaceDecl) {
    let ops: Vec<&OperatorDescriptor> = registry.exported_in(&ns.name).collect();
    let needs_callback = ops.iter().any(|op| !op.is_constructible());

    src.blank();
    src.line(format!("/// {}", ns.description));
    src.line(format!("pub mod {} {{", ns.name));
    src.indent();
    if needs_callback {
        src.line("use super::{HostCallback, Operator, OperatorKind};");
    } else {
        src.line("use super::{Operator, OperatorKind};");
    }
    for op in ops {
        let args: Vec<String> = op
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty.constructor_arg()))
            .collect();
        let values: Vec<String> = op
            .params
            .iter()
            .map(|p| p.ty.constructor_value(&p.name))
            .collect();
        src.blank();
        if let Some(doc) = &op.doc {
            src.line(format!("/// {doc}"));
        }
        src.line(format!(
            "pub fn {}({}) -> Operator {{",
            op.external_name,
            args.join(", ")
        ));
        src.indent();
        variant_into(src, op, &values);
        src.dedent();
        src.line("}");
    }
    src.dedent();
    src.line("}");
}

fn emit_op_module(src: &mut Source, registry: &Registry) {
    // rustfmt sorts the items of a use list.
    let mut names: Vec<&str> = registry.namespaces.iter().map(|ns| ns.name.as_str()).collect();
    names.sort_unstable();
    src.blank();
    src.line("/// Every namespace under one root: `op::text::split(\",\")`.");
    src.line("pub mod op {");
    src.indent();
    src.line(format!("pub use super::{{{}}};", names.join(", ")));
    src.dedent();
    src.line("}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parse_registry;

    const REGISTRY: &str = r#"
/// @namespace text "Text operations."
/// @namespace core "Anything."
pub enum OperatorKind {
    /// Split text on a delimiter.
    /// @op name=split
    /// @sig in=str out=list[str]
    /// @ns text
    /// @param delim:str
    Split { delim: String },

    /// @op name=len
    /// @sig in=object out=int
    /// @ns core
    /// @alias text
    Len,
}
"#;

    fn emitted() -> String {
        NativeEmitter.emit(&parse_registry(REGISTRY).unwrap())
    }

    #[test]
    fn starts_with_generated_header() {
        assert!(emitted().starts_with("// @generated by `rope generate`"));
    }

    #[test]
    fn descriptor_table_in_registry_order() {
        let out = emitted();
        let split = out.find("internal_name: \"Split\"").unwrap();
        let len = out.find("internal_name: \"Len\"").unwrap();
        assert!(split < len);
        assert!(out.contains("params: &[(\"delim\", \"str\")],"));
        assert!(out.contains("aliases: &[\"text\"],"));
        assert!(out.contains("OperatorKind::Split { .. } => &DESCRIPTORS[0],"));
        assert!(out.contains("OperatorKind::Len => &DESCRIPTORS[1],"));
    }

    #[test]
    fn dispatch_routes_to_primary_namespace() {
        let out = emitted();
        assert!(out.contains("OperatorKind::Split { delim } => apply::text::split(value, delim),"));
        assert!(out.contains("OperatorKind::Len => apply::core::len(value),"));
    }

    #[test]
    fn construct_accepts_aliases() {
        let out = emitted();
        assert!(out.contains("(\"core\", \"len\") | (\"text\", \"len\") => {"));
        assert!(out.contains("delim: args::param(params, 0, \"delim\")?,"));
        assert!(out.contains("_ => Err(args::unknown_operator(namespace, name)),"));
    }

    #[test]
    fn alias_constructor_lives_in_both_modules() {
        let out = emitted();
        let text = &out[out.find("pub mod text {").unwrap()..out.find("pub mod core {").unwrap()];
        assert!(text.contains("pub fn split(delim: impl Into<String>) -> Operator {"));
        assert!(text.contains("pub fn len() -> Operator {"));
        assert!(text.contains("/// Split text on a delimiter."));
        assert!(out.contains("pub use super::{core, text};"));
    }

    /// Lines rustfmt would rewrite: anything past the width limit, and a
    /// struct literal split over lines although its fields fit on one.
    fn rustfmt_rewrites(out: &str) -> Vec<String> {
        let lines: Vec<&str> = out.lines().collect();
        let mut found = Vec::new();
        for (idx, line) in lines.iter().enumerate() {
            if line.len() > MAX_WIDTH {
                found.push(line.to_string());
            }
            if line.trim_start().contains("OperatorKind::") && line.ends_with(" {") {
                let fields: Vec<&str> = lines[idx + 1..]
                    .iter()
                    .take_while(|l| l.trim() != "}")
                    .map(|l| l.trim().trim_end_matches(','))
                    .collect();
                if fields.join(", ").len() <= STRUCT_LIT_WIDTH {
                    found.push(line.to_string());
                }
            }
        }
        found
    }

    // --- rustfmt stability ---

    #[test]
    fn short_struct_literals_stay_on_one_line() {
        let registry = parse_registry(&format!(
            "{}\n{}",
            REGISTRY.trim_end().trim_end_matches('}'),
            r#"
    /// @op name=index
    /// @sig in=Sequence[object] out=object
    /// @ns core
    /// @param idx:int
    Index { idx: i64 },
}
"#
        ))
        .unwrap();
        let out = NativeEmitter.emit(&registry);
        assert!(out.contains("        OperatorKind::Index { idx }.into()\n"));
        assert!(out.contains("            Ok(OperatorKind::Split {\n                delim: args::param(params, 0, \"delim\")?,\n            }\n            .into())\n"));
        assert!(out.contains("        OperatorKind::Split {\n            delim: delim.into(),\n        }\n        .into()\n"));
        assert_eq!(rustfmt_rewrites(&out), Vec::<String>::new());
    }

    #[test]
    fn use_list_is_sorted() {
        let out = emitted();
        let line = out.lines().find(|l| l.trim_start().starts_with("pub use super::{")).unwrap();
        let inner = line.trim().trim_start_matches("pub use super::{").trim_end_matches("};");
        let names: Vec<&str> = inner.split(", ").collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn no_callback_import_without_escape_ops() {
        assert!(!emitted().contains("HostCallback"));
    }
}
