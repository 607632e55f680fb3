//! Registry front end.
//!
//! Reads the annotated `pub enum OperatorKind` declaration and produces a
//! [`Registry`]. The enum's own doc comment declares namespaces:
//!
//! ```text
//! /// @namespace text "Text operations."
//! ```
//!
//! and each variant carries its operator metadata:
//!
//! ```text
//! /// Split text on a delimiter.
//! /// @op name=split
//! /// @sig in=str out=list[str]
//! /// @ns text
//! /// @param delim:str
//! Split { delim: String },
//! ```
//!
//! Optional tags are `@alias <namespace>` and `@escape`. Untagged doc lines
//! become the operator description. Every inconsistency is a
//! [`RopeError::Metadata`] pointing at the offending line.

use std::collections::{HashMap, HashSet};

use rope_types::{Result, RopeError};
use winnow::ascii::{space0, space1};
use winnow::combinator::{delimited, opt, separated};
use winnow::{ModalResult, Parser};

use crate::descriptor::{NamespaceDecl, OperatorDescriptor, ParamDescriptor, ParamType, Registry};
use crate::signature::{identifier, type_expr, TypeExpr};

const REGISTRY_ENUM: &str = "pub enum OperatorKind";

/// Names that cannot be used as generated function or module names.
/// Module names the generated dispatch file already uses for its own imports
/// and the `op` root; a namespace module with one of these names would clash.
const RESERVED_NAMESPACES: &[&str] = &["apply", "args", "op"];

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

struct DocLine<'a> {
    line: usize,
    text: &'a str,
}

struct VariantDecl {
    name: String,
    fields: Vec<(String, String)>,
}

enum Tag {
    Op(String),
    Sig(TypeExpr, TypeExpr),
    Ns(String),
    Param(String, String),
    Alias(String),
    Escape,
}

enum State {
    BeforeEnum,
    Variants,
    AfterEnum,
}

fn metadata_error(line: usize, snippet: &str, message: impl Into<String>) -> RopeError {
    RopeError::Metadata {
        line,
        message: message.into(),
        snippet: Some(snippet.trim().to_string()),
    }
}

fn is_identifier(text: &str) -> bool {
    let mut rest = text;
    identifier.parse_next(&mut rest).is_ok() && rest.is_empty()
}

fn split_keyword(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (text, ""),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse the registry source into descriptors, in declaration order.
pub fn parse_registry(source: &str) -> Result<Registry> {
    let mut namespaces = Vec::new();
    let mut operators = Vec::new();
    let mut pending: Vec<DocLine<'_>> = Vec::new();
    let mut state = State::BeforeEnum;
    let mut enum_line = 0;

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if let Some(doc) = trimmed.strip_prefix("///") {
            pending.push(DocLine {
                line,
                text: doc.trim(),
            });
            continue;
        }

        match state {
            State::BeforeEnum => {
                if trimmed.starts_with(REGISTRY_ENUM) {
                    for doc in pending.drain(..) {
                        if let Some(decl) = parse_namespace_doc(&doc)? {
                            namespaces.push(decl);
                        }
                    }
                    enum_line = line;
                    state = State::Variants;
                } else if !trimmed.is_empty() && !trimmed.starts_with("#[") {
                    pending.clear();
                }
            }
            State::Variants => {
                if trimmed == "}" {
                    if let Some(doc) = pending.first() {
                        return Err(metadata_error(
                            doc.line,
                            doc.text,
                            "annotation is not attached to any variant",
                        ));
                    }
                    state = State::AfterEnum;
                } else if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with("#[") {
                    continue;
                } else {
                    let variant = parse_variant(line, trimmed)?;
                    let docs = std::mem::take(&mut pending);
                    operators.push(build_descriptor(line, trimmed, variant, &docs)?);
                }
            }
            State::AfterEnum => {}
        }
    }

    match state {
        State::BeforeEnum => {
            return Err(metadata_error(
                1,
                "",
                format!("no `{REGISTRY_ENUM}` declaration found"),
            ))
        }
        State::Variants => {
            return Err(metadata_error(
                enum_line,
                REGISTRY_ENUM,
                "registry enum is not closed",
            ))
        }
        State::AfterEnum => {}
    }

    check_registry(&namespaces, &operators)?;
    tracing::debug!(
        namespaces = namespaces.len(),
        operators = operators.len(),
        "Parsed operator registry"
    );
    Ok(Registry {
        namespaces,
        operators,
    })
}

// ---------------------------------------------------------------------------
// Namespace declarations
// ---------------------------------------------------------------------------

fn parse_namespace_doc(doc: &DocLine<'_>) -> Result<Option<NamespaceDecl>> {
    if !doc.text.starts_with('@') {
        return Ok(None);
    }
    let (keyword, rest) = split_keyword(doc.text);
    if keyword != "@namespace" {
        return Err(metadata_error(
            doc.line,
            doc.text,
            format!("tag '{keyword}' is not allowed on the registry enum; expected @namespace"),
        ));
    }
    let usage = "expected @namespace <name> \"<description>\"";
    let (name, description) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| metadata_error(doc.line, doc.text, usage))?;
    let description = description
        .trim()
        .strip_prefix('"')
        .and_then(|d| d.strip_suffix('"'))
        .ok_or_else(|| metadata_error(doc.line, doc.text, usage))?;
    if !is_identifier(name) {
        return Err(metadata_error(
            doc.line,
            doc.text,
            format!("namespace name '{name}' is not an identifier"),
        ));
    }
    Ok(Some(NamespaceDecl {
        name: name.to_string(),
        description: description.to_string(),
        line: doc.line,
    }))
}

// ---------------------------------------------------------------------------
// Variant declarations
// ---------------------------------------------------------------------------

fn field(input: &mut &str) -> ModalResult<(String, String)> {
    let name = identifier.parse_next(input)?;
    let _ = (space0, ':', space0).parse_next(input)?;
    let ty = identifier.parse_next(input)?;
    Ok((name.to_string(), ty.to_string()))
}

fn variant_decl(input: &mut &str) -> ModalResult<VariantDecl> {
    let name = identifier.parse_next(input)?;
    let _ = space0.parse_next(input)?;
    let fields: Option<Vec<(String, String)>> = opt(delimited(
        ('{', space0),
        separated(1.., field, (space0, ',', space0)),
        (space0, '}'),
    ))
    .parse_next(input)?;
    let _ = (space0, ',').parse_next(input)?;
    Ok(VariantDecl {
        name: name.to_string(),
        fields: fields.unwrap_or_default(),
    })
}

fn parse_variant(line: usize, text: &str) -> Result<VariantDecl> {
    let mut remaining = text;
    match variant_decl.parse_next(&mut remaining) {
        Ok(variant) if remaining.trim().is_empty() => Ok(variant),
        _ => Err(metadata_error(
            line,
            text,
            "expected a variant declaration like `Name,` or `Name { field: Type },`",
        )),
    }
}

// ---------------------------------------------------------------------------
// Operator tags
// ---------------------------------------------------------------------------

fn sig_body(input: &mut &str) -> ModalResult<(TypeExpr, TypeExpr)> {
    let _ = "in=".parse_next(input)?;
    let input_ty = type_expr.parse_next(input)?;
    let _ = (space1, "out=").parse_next(input)?;
    let output_ty = type_expr.parse_next(input)?;
    Ok((input_ty, output_ty))
}

fn expect_identifier<'a>(doc: &DocLine<'_>, what: &str, text: &'a str) -> Result<&'a str> {
    if is_identifier(text) {
        Ok(text)
    } else {
        Err(metadata_error(
            doc.line,
            doc.text,
            format!("{what} '{text}' is not an identifier"),
        ))
    }
}

/// `Ok(None)` for description lines.
fn parse_tag(doc: &DocLine<'_>) -> Result<Option<Tag>> {
    if !doc.text.starts_with('@') {
        return Ok(None);
    }
    let (keyword, rest) = split_keyword(doc.text);
    let tag = match keyword {
        "@op" => {
            let name = rest.strip_prefix("name=").ok_or_else(|| {
                metadata_error(doc.line, doc.text, "expected @op name=<external name>")
            })?;
            Tag::Op(expect_identifier(doc, "operator name", name)?.to_string())
        }
        "@sig" => {
            let mut remaining = rest;
            let (input, output) = match sig_body.parse_next(&mut remaining) {
                Ok(sig) if remaining.trim().is_empty() => sig,
                _ => {
                    return Err(metadata_error(
                        doc.line,
                        doc.text,
                        "malformed signature; expected @sig in=<type> out=<type>",
                    ))
                }
            };
            for ty in [&input, &output] {
                ty.check_known()
                    .map_err(|message| metadata_error(doc.line, doc.text, message))?;
            }
            Tag::Sig(input, output)
        }
        "@ns" => Tag::Ns(expect_identifier(doc, "namespace", rest)?.to_string()),
        "@param" => {
            let (name, ty) = rest.split_once(':').ok_or_else(|| {
                metadata_error(doc.line, doc.text, "expected @param <name>:<type>")
            })?;
            let name = expect_identifier(doc, "parameter name", name.trim())?;
            Tag::Param(name.to_string(), ty.trim().to_string())
        }
        "@alias" => Tag::Alias(expect_identifier(doc, "alias namespace", rest)?.to_string()),
        "@escape" if rest.is_empty() => Tag::Escape,
        "@namespace" => {
            return Err(metadata_error(
                doc.line,
                doc.text,
                "@namespace belongs on the registry enum, not on a variant",
            ))
        }
        other => {
            return Err(metadata_error(
                doc.line,
                doc.text,
                format!("unknown or malformed tag '{other}'"),
            ))
        }
    };
    Ok(Some(tag))
}

fn set_once<T>(slot: &mut Option<T>, value: T, doc: &DocLine<'_>, tag: &str) -> Result<()> {
    if slot.is_some() {
        return Err(metadata_error(
            doc.line,
            doc.text,
            format!("{tag} is given more than once"),
        ));
    }
    *slot = Some(value);
    Ok(())
}

fn build_descriptor(
    line: usize,
    text: &str,
    variant: VariantDecl,
    docs: &[DocLine<'_>],
) -> Result<OperatorDescriptor> {
    let mut external = None;
    let mut sig = None;
    let mut namespace = None;
    let mut params: Vec<(&DocLine<'_>, String, String)> = Vec::new();
    let mut aliases = Vec::new();
    let mut escape = false;
    let mut prose = Vec::new();

    for doc in docs {
        match parse_tag(doc)? {
            None if doc.text.is_empty() => {}
            None => prose.push(doc.text),
            Some(Tag::Op(name)) => set_once(&mut external, name, doc, "@op")?,
            Some(Tag::Sig(input, output)) => set_once(&mut sig, (input, output), doc, "@sig")?,
            Some(Tag::Ns(ns)) => set_once(&mut namespace, ns, doc, "@ns")?,
            Some(Tag::Param(name, ty)) => params.push((doc, name, ty)),
            Some(Tag::Alias(ns)) => aliases.push(ns),
            Some(Tag::Escape) => escape = true,
        }
    }

    let missing = |tag: &str| {
        metadata_error(
            line,
            text,
            format!("variant '{}' is missing the required {tag} tag", variant.name),
        )
    };
    let external_name = external.ok_or_else(|| missing("@op"))?;
    let (input, output) = sig.ok_or_else(|| missing("@sig"))?;
    let namespace = namespace.ok_or_else(|| missing("@ns"))?;

    if RUST_KEYWORDS.contains(&external_name.as_str()) {
        return Err(metadata_error(
            line,
            text,
            format!("operator name '{external_name}' is a reserved word"),
        ));
    }

    let mut typed = Vec::with_capacity(params.len());
    for (doc, name, ty) in &params {
        let param_type = ParamType::from_tag(ty).ok_or_else(|| {
            metadata_error(
                doc.line,
                doc.text,
                format!("parameter '{name}' has unrepresentable type '{ty}'"),
            )
        })?;
        if param_type == ParamType::Callable && !escape {
            return Err(metadata_error(
                doc.line,
                doc.text,
                format!("parameter '{name}' is a host callback; only @escape operators may take one"),
            ));
        }
        typed.push((*doc, name.clone(), param_type));
    }

    if typed.len() != variant.fields.len() {
        return Err(metadata_error(
            line,
            text,
            format!(
                "variant '{}' has {} field(s) but {} @param tag(s)",
                variant.name,
                variant.fields.len(),
                typed.len()
            ),
        ));
    }
    for ((doc, name, param_type), (field_name, field_type)) in typed.iter().zip(&variant.fields) {
        if name != field_name {
            return Err(metadata_error(
                doc.line,
                doc.text,
                format!("@param '{name}' does not match field '{field_name}' in declaration order"),
            ));
        }
        if param_type.rust_field_type() != field_type.as_str() {
            return Err(metadata_error(
                line,
                text,
                format!(
                    "field '{field_name}' is `{field_type}` but @param type '{}' requires `{}`",
                    param_type.as_tag(),
                    param_type.rust_field_type()
                ),
            ));
        }
    }

    Ok(OperatorDescriptor {
        internal_name: variant.name,
        external_name,
        namespace,
        aliases,
        input,
        output,
        params: typed
            .into_iter()
            .map(|(_, name, ty)| ParamDescriptor { name, ty })
            .collect(),
        escape,
        doc: if prose.is_empty() {
            None
        } else {
            Some(prose.join(" "))
        },
        line,
    })
}

// ---------------------------------------------------------------------------
// Registry-wide consistency
// ---------------------------------------------------------------------------

fn check_registry(namespaces: &[NamespaceDecl], operators: &[OperatorDescriptor]) -> Result<()> {
    let mut declared: HashMap<&str, &NamespaceDecl> = HashMap::new();
    for decl in namespaces {
        if RUST_KEYWORDS.contains(&decl.name.as_str()) {
            return Err(metadata_error(
                decl.line,
                &decl.name,
                format!("namespace '{}' is a reserved word", decl.name),
            ));
        }
        if RESERVED_NAMESPACES.contains(&decl.name.as_str()) {
            return Err(metadata_error(
                decl.line,
                &decl.name,
                format!(
                    "namespace '{}' clashes with a module of the generated dispatch file",
                    decl.name
                ),
            ));
        }
        if declared.insert(decl.name.as_str(), decl).is_some() {
            return Err(metadata_error(
                decl.line,
                &decl.name,
                format!("namespace '{}' is declared more than once", decl.name),
            ));
        }
    }

    let mut internal: HashSet<&str> = HashSet::new();
    let mut external: HashSet<(&str, &str)> = HashSet::new();
    for op in operators {
        if !internal.insert(op.internal_name.as_str()) {
            return Err(metadata_error(
                op.line,
                &op.internal_name,
                format!("duplicate internal name '{}'", op.internal_name),
            ));
        }
        for ns in op.namespaces() {
            if !declared.contains_key(ns) {
                return Err(metadata_error(
                    op.line,
                    &op.internal_name,
                    format!(
                        "operator '{}' uses namespace '{ns}', which is not declared with @namespace",
                        op.internal_name
                    ),
                ));
            }
            if !external.insert((ns, op.external_name.as_str())) {
                return Err(metadata_error(
                    op.line,
                    &op.internal_name,
                    format!("duplicate external name '{ns}.{}'", op.external_name),
                ));
            }
        }
    }

    // A declared namespace nothing exports under would be unreachable.
    for decl in namespaces {
        if !operators.iter().any(|op| op.exported_in(&decl.name)) {
            return Err(metadata_error(
                decl.line,
                &decl.name,
                format!("namespace '{}' is declared but exports no operator", decl.name),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"
/// Registry under test.
///
/// @namespace text "Text operations."
/// @namespace core "Anything."
#[derive(Clone, Debug)]
pub enum OperatorKind {
"#;

    fn registry(variants: &str) -> Result<Registry> {
        parse_registry(&format!("{HEADER}{variants}}}\n"))
    }

    fn metadata_line(result: Result<Registry>) -> (usize, String) {
        match result {
            Err(RopeError::Metadata { line, message, .. }) => (line, message),
            other => panic!("expected a metadata error, got {other:?}"),
        }
    }

    const SPLIT: &str = "    /// Split text.
    /// @op name=split
    /// @sig in=str out=list[str]
    /// @ns text
    /// @param delim:str
    Split { delim: String },
";

    const LEN: &str = "    /// @op name=len
    /// @sig in=object out=int
    /// @ns core
    /// @alias text
    Len,
";

    // --- happy path ---

    #[test]
    fn parses_namespaces_and_operators() {
        let reg = registry(&format!("{SPLIT}\n{LEN}")).unwrap();
        assert_eq!(reg.namespaces.len(), 2);
        assert_eq!(reg.namespaces[0].name, "text");
        assert_eq!(reg.namespaces[0].description, "Text operations.");

        let split = reg.operator("Split").unwrap();
        assert_eq!(split.external_name, "split");
        assert_eq!(split.namespace, "text");
        assert_eq!(split.input.to_string(), "str");
        assert_eq!(split.output.to_string(), "list[str]");
        assert_eq!(split.params.len(), 1);
        assert_eq!(split.params[0].name, "delim");
        assert_eq!(split.params[0].ty, ParamType::Str);
        assert_eq!(split.doc.as_deref(), Some("Split text."));
        assert!(!split.escape);

        let len = reg.operator("Len").unwrap();
        assert_eq!(len.aliases, vec!["text".to_string()]);
        assert!(len.exported_in("text"));
        assert!(len.doc.is_none());
    }

    #[test]
    fn declaration_order_is_kept() {
        let reg = registry(&format!("{LEN}{SPLIT}")).unwrap();
        let names: Vec<_> = reg.operators.iter().map(|o| o.internal_name.as_str()).collect();
        assert_eq!(names, vec!["Len", "Split"]);
    }

    #[test]
    fn escape_operator_may_take_callback() {
        let reg = registry(&format!(
            "{SPLIT}    /// @op name=map_host
    /// @sig in=object out=object
    /// @ns core
    /// @param func:callable
    /// @escape
    MapHost {{ func: HostCallback }},
"
        ))
        .unwrap();
        let op = reg.operator("MapHost").unwrap();
        assert!(op.escape);
        assert!(!op.is_constructible());
        assert!(reg.has_callable_params());
    }

    // --- metadata errors ---

    #[test]
    fn missing_required_tag() {
        let (line, message) = metadata_line(registry(
            "    /// @op name=len
    /// @ns core
    Len,
",
        ));
        assert_eq!(line, 10);
        assert!(message.contains("@sig"), "{message}");
    }

    #[test]
    fn duplicate_internal_name() {
        let (_, message) = metadata_line(registry(&format!("{SPLIT}{SPLIT}")));
        assert!(message.contains("duplicate internal name 'Split'"), "{message}");
    }

    #[test]
    fn duplicate_external_name_in_namespace() {
        let (line, message) = metadata_line(registry(&format!(
            "{SPLIT}    /// @op name=split
    /// @sig in=str out=list[str]
    /// @ns text
    /// @param sep:str
    SplitAgain {{ sep: String }},
"
        )));
        assert_eq!(line, 18);
        assert!(message.contains("duplicate external name 'text.split'"), "{message}");
    }

    #[test]
    fn alias_collision_is_a_duplicate() {
        let (_, message) = metadata_line(registry(&format!(
            "{LEN}    /// @op name=len
    /// @sig in=str out=int
    /// @ns text
    TextLen,
"
        )));
        assert!(message.contains("'text.len'"), "{message}");
    }

    #[test]
    fn malformed_signature() {
        let (line, message) = metadata_line(registry(
            "    /// @op name=len
    /// @sig in=object out=list[int
    /// @ns core
    Len,
",
        ));
        assert_eq!(line, 9);
        assert!(message.contains("malformed signature"), "{message}");
    }

    #[test]
    fn unknown_signature_type() {
        let (_, message) = metadata_line(registry(
            "    /// @op name=len
    /// @sig in=Widget out=int
    /// @ns core
    Len,
",
        ));
        assert!(message.contains("unknown type 'Widget'"), "{message}");
    }

    #[test]
    fn unrepresentable_parameter_type() {
        let (line, message) = metadata_line(registry(
            "    /// @op name=split
    /// @sig in=str out=list[str]
    /// @ns text
    /// @param delim:bytes
    Split { delim: String },
",
        ));
        assert_eq!(line, 11);
        assert!(message.contains("unrepresentable type 'bytes'"), "{message}");
    }

    #[test]
    fn callable_requires_escape() {
        let (_, message) = metadata_line(registry(
            "    /// @op name=map_host
    /// @sig in=object out=object
    /// @ns core
    /// @param func:callable
    MapHost { func: HostCallback },
",
        ));
        assert!(message.contains("only @escape operators"), "{message}");
    }

    #[test]
    fn params_must_match_fields() {
        let (_, count) = metadata_line(registry(
            "    /// @op name=split
    /// @sig in=str out=list[str]
    /// @ns text
    Split { delim: String },
",
        ));
        assert!(count.contains("1 field(s) but 0 @param"), "{count}");

        let (_, ty) = metadata_line(registry(
            "    /// @op name=index
    /// @sig in=str out=str
    /// @ns text
    /// @param idx:int
    Index { idx: usize },
",
        ));
        assert!(ty.contains("requires `i64`"), "{ty}");
    }

    #[test]
    fn undeclared_namespace() {
        let (_, message) = metadata_line(registry(
            "    /// @op name=json
    /// @sig in=str out=object
    /// @ns decode
    JsonDecode,
",
        ));
        assert!(message.contains("namespace 'decode'"), "{message}");
    }

    #[test]
    fn declared_namespace_without_operators() {
        let (line, message) = metadata_line(registry(SPLIT));
        assert_eq!(line, 5);
        assert!(message.contains("'core' is declared but exports no operator"), "{message}");
    }

    #[test]
    fn unknown_tag() {
        let (_, message) = metadata_line(registry(
            "    /// @op name=len
    /// @sig in=object out=int
    /// @ns core
    /// @deprecated
    Len,
",
        ));
        assert!(message.contains("'@deprecated'"), "{message}");
    }

    #[test]
    fn reserved_operator_name() {
        let (_, message) = metadata_line(registry(
            "    /// @op name=type
    /// @sig in=object out=str
    /// @ns core
    TypeOf,
",
        ));
        assert!(message.contains("reserved word"), "{message}");
    }

    #[test]
    fn namespace_clashing_with_generated_modules() {
        for reserved in ["op", "apply", "args"] {
            let header = HEADER.replace("@namespace core", &format!("@namespace {reserved}"));
            let source = format!("{header}{SPLIT}}}\n");
            let (line, message) = metadata_line(parse_registry(&source));
            assert_eq!(line, 5, "{reserved}");
            assert!(message.contains(&format!("namespace '{reserved}' clashes")), "{message}");
        }
    }

    #[test]
    fn dangling_annotation_before_close() {
        let (_, message) = metadata_line(registry(&format!("{SPLIT}{LEN}    /// @op name=x\n")));
        assert!(message.contains("not attached"), "{message}");
    }

    #[test]
    fn missing_enum() {
        let (line, message) = metadata_line(parse_registry("pub struct Nothing;\n"));
        assert_eq!(line, 1);
        assert!(message.contains("pub enum OperatorKind"), "{message}");
    }
}
