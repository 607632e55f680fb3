//! Operator type signatures: `object`, `str`, `list[str]`,
//! `Mapping[str, object]`, `str | None`, ...
//!
//! Parsed with winnow, rendered back in a canonical spacing so the stub
//! emitter's output does not depend on how the registry author typed them.

use std::fmt;

use serde::{Serialize, Serializer};
use winnow::ascii::space0;
use winnow::combinator::{delimited, opt, separated};
use winnow::token::take_while;
use winnow::{ModalResult, Parser};

/// Type names a signature may mention, with their number of type arguments.
const KNOWN_TYPES: &[(&str, usize)] = &[
    ("object", 0),
    ("str", 0),
    ("int", 0),
    ("float", 0),
    ("bool", 0),
    ("None", 0),
    ("list", 1),
    ("Sequence", 1),
    ("dict", 2),
    ("Mapping", 2),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named { name: String, args: Vec<TypeExpr> },
    Union(Vec<TypeExpr>),
}

impl TypeExpr {
    pub fn named(name: &str) -> Self {
        TypeExpr::Named {
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    /// Check every type name against the known set and its arity.
    pub fn check_known(&self) -> Result<(), String> {
        match self {
            TypeExpr::Union(members) => members.iter().try_for_each(TypeExpr::check_known),
            TypeExpr::Named { name, args } => {
                let arity = KNOWN_TYPES
                    .iter()
                    .find(|(known, _)| *known == name.as_str())
                    .map(|(_, arity)| *arity)
                    .ok_or_else(|| format!("unknown type '{name}' in signature"))?;
                // Bare generics (`list`, `Mapping`) are allowed.
                if !args.is_empty() && args.len() != arity {
                    return Err(format!(
                        "type '{name}' takes {arity} type argument(s), got {}",
                        args.len()
                    ));
                }
                args.iter().try_for_each(TypeExpr::check_known)
            }
        }
    }

    /// Can a value typed `self` flow into a step that accepts `target`?
    pub fn is_assignable_to(&self, target: &TypeExpr) -> bool {
        match (self, target) {
            (TypeExpr::Union(members), _) => members.iter().all(|m| m.is_assignable_to(target)),
            (_, TypeExpr::Union(members)) => members.iter().any(|m| self.is_assignable_to(m)),
            (
                TypeExpr::Named { name: src, args: src_args },
                TypeExpr::Named { name: dst, args: dst_args },
            ) => {
                if dst == "object" {
                    return true;
                }
                let base_ok = src == dst
                    || (src == "list" && dst == "Sequence")
                    || (src == "dict" && dst == "Mapping")
                    || (src == "int" && dst == "float");
                if !base_ok {
                    return false;
                }
                if dst_args.is_empty() {
                    return true;
                }
                src_args.len() == dst_args.len()
                    && src_args
                        .iter()
                        .zip(dst_args)
                        .all(|(s, d)| s.is_assignable_to(d))
            }
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { name, args } if args.is_empty() => f.write_str(name),
            TypeExpr::Named { name, args } => {
                let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{name}[{}]", rendered.join(", "))
            }
            TypeExpr::Union(members) => {
                let rendered: Vec<String> = members.iter().map(|m| m.to_string()).collect();
                f.write_str(&rendered.join(" | "))
            }
        }
    }
}

impl Serialize for TypeExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1, |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

fn atom(input: &mut &str) -> ModalResult<TypeExpr> {
    let name = identifier.parse_next(input)?;
    let args: Option<Vec<TypeExpr>> = opt(delimited(
        ('[', space0),
        separated(1.., type_expr, (space0, ',', space0)),
        (space0, ']'),
    ))
    .parse_next(input)?;
    Ok(TypeExpr::Named {
        name: name.to_string(),
        args: args.unwrap_or_default(),
    })
}

/// `atom ( '|' atom )*`, leaving any trailing input unconsumed.
pub(crate) fn type_expr(input: &mut &str) -> ModalResult<TypeExpr> {
    let mut members: Vec<TypeExpr> = separated(1.., atom, (space0, '|', space0)).parse_next(input)?;
    if members.len() == 1 {
        Ok(members.remove(0))
    } else {
        Ok(TypeExpr::Union(members))
    }
}

/// Parse a complete signature type. Trailing input is an error.
pub fn parse_type(text: &str) -> Result<TypeExpr, String> {
    let mut remaining = text.trim();
    let expr = type_expr
        .parse_next(&mut remaining)
        .map_err(|_| format!("malformed type '{}'", text.trim()))?;
    if !remaining.trim().is_empty() {
        return Err(format!(
            "malformed type '{}': unexpected '{}'",
            text.trim(),
            remaining.trim()
        ));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_and_generic() {
        assert_eq!(parse_type("object").unwrap(), TypeExpr::named("object"));
        let list = parse_type("list[str]").unwrap();
        assert_eq!(
            list,
            TypeExpr::Named {
                name: "list".into(),
                args: vec![TypeExpr::named("str")]
            }
        );
    }

    #[test]
    fn canonical_rendering() {
        assert_eq!(parse_type("Mapping[str,object]").unwrap().to_string(), "Mapping[str, object]");
        assert_eq!(parse_type("str|None").unwrap().to_string(), "str | None");
        assert_eq!(
            parse_type(" Sequence[ list[int] ] ").unwrap().to_string(),
            "Sequence[list[int]]"
        );
    }

    #[test]
    fn malformed_signatures_fail() {
        assert!(parse_type("list[str").is_err());
        assert!(parse_type("[str]").is_err());
        assert!(parse_type("str extra").is_err());
        assert!(parse_type("").is_err());
    }

    #[test]
    fn unknown_names_and_arity() {
        assert!(parse_type("Widget").unwrap().check_known().is_err());
        assert!(parse_type("list[str, int]").unwrap().check_known().is_err());
        assert!(parse_type("Mapping[str, list[int]]").unwrap().check_known().is_ok());
        assert!(parse_type("list").unwrap().check_known().is_ok());
    }

    // --- assignability ---

    fn assignable(src: &str, dst: &str) -> bool {
        parse_type(src).unwrap().is_assignable_to(&parse_type(dst).unwrap())
    }

    #[test]
    fn everything_flows_into_object() {
        assert!(assignable("list[str]", "object"));
        assert!(assignable("str | None", "object"));
    }

    #[test]
    fn object_does_not_narrow() {
        assert!(!assignable("object", "str"));
    }

    #[test]
    fn containers_are_covariant() {
        assert!(assignable("list[str]", "Sequence[object]"));
        assert!(assignable("dict[str, int]", "Mapping[str, object]"));
        assert!(!assignable("list[object]", "Sequence[str]"));
    }

    #[test]
    fn unions() {
        assert!(assignable("str", "str | None"));
        assert!(!assignable("str | None", "str"));
        assert!(assignable("int", "float"));
    }
}
