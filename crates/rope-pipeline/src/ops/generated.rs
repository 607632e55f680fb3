// @generated by `rope generate` from the operator registry. Do not edit by hand.
// `rope verify` fails when this file drifts from `ops/kind.rs`.

use rope_types::{StepResult, Value};

use super::apply;
use super::args;
use super::descriptor::OpDescriptor;
use super::kind::OperatorKind;
use crate::blueprint::Operator;
use crate::host::HostCallback;

/// Declared namespaces, in registry order.
pub const NAMESPACES: &[&str] = &["coerce", "text", "seq", "map", "core", "decode"];

/// One entry per operator, in registry order.
pub static DESCRIPTORS: &[OpDescriptor] = &[
    OpDescriptor {
        internal_name: "AssertStr",
        external_name: "assert_str",
        namespace: "coerce",
        aliases: &[],
        input: "object",
        output: "str",
        params: &[],
        escape: false,
    },
    OpDescriptor {
        internal_name: "ExpectStr",
        external_name: "expect_str",
        namespace: "coerce",
        aliases: &[],
        input: "object",
        output: "str",
        params: &[],
        escape: false,
    },
    OpDescriptor {
        internal_name: "AsInt",
        external_name: "as_int",
        namespace: "coerce",
        aliases: &[],
        input: "object",
        output: "int",
        params: &[],
        escape: false,
    },
    OpDescriptor {
        internal_name: "AsFloat",
        external_name: "as_float",
        namespace: "coerce",
        aliases: &[],
        input: "object",
        output: "float",
        params: &[],
        escape: false,
    },
    OpDescriptor {
        internal_name: "AsBool",
        external_name: "as_bool",
        namespace: "coerce",
        aliases: &[],
        input: "object",
        output: "bool",
        params: &[],
        escape: false,
    },
    OpDescriptor {
        internal_name: "AsDatetime",
        external_name: "as_datetime",
        namespace: "coerce",
        aliases: &[],
        input: "object",
        output: "str",
        params: &[("format", "str")],
        escape: false,
    },
    OpDescriptor {
        internal_name: "Split",
        external_name: "split",
        namespace: "text",
        aliases: &[],
        input: "str",
        output: "list[str]",
        params: &[("delim", "str")],
        escape: false,
    },
    OpDescriptor {
        internal_name: "ToUppercase",
        external_name: "to_uppercase",
        namespace: "text",
        aliases: &[],
        input: "str",
        output: "str",
        params: &[],
        escape: false,
    },
    OpDescriptor {
        internal_name: "ToLowercase",
        external_name: "to_lowercase",
        namespace: "text",
        aliases: &[],
        input: "str",
        output: "str",
        params: &[],
        escape: false,
    },
    OpDescriptor {
        internal_name: "Index",
        external_name: "index",
        namespace: "seq",
        aliases: &["text"],
        input: "Sequence[object]",
        output: "object",
        params: &[("idx", "int")],
        escape: false,
    },
    OpDescriptor {
        internal_name: "GetKey",
        external_name: "get",
        namespace: "map",
        aliases: &[],
        input: "Mapping[str, object]",
        output: "object",
        params: &[("key", "str")],
        escape: false,
    },
    OpDescriptor {
        internal_name: "Len",
        external_name: "len",
        namespace: "core",
        aliases: &["text"],
        input: "object",
        output: "int",
        params: &[],
        escape: false,
    },
    OpDescriptor {
        internal_name: "MapHost",
        external_name: "map_host",
        namespace: "core",
        aliases: &[],
        input: "object",
        output: "object",
        params: &[("func", "callable")],
        escape: true,
    },
    OpDescriptor {
        internal_name: "JsonDecode",
        external_name: "json",
        namespace: "decode",
        aliases: &[],
        input: "str",
        output: "object",
        params: &[],
        escape: false,
    },
];

impl OperatorKind {
    /// Registry metadata for this operator.
    pub fn descriptor(&self) -> &'static OpDescriptor {
        match self {
            OperatorKind::AssertStr => &DESCRIPTORS[0],
            OperatorKind::ExpectStr => &DESCRIPTORS[1],
            OperatorKind::AsInt => &DESCRIPTORS[2],
            OperatorKind::AsFloat => &DESCRIPTORS[3],
            OperatorKind::AsBool => &DESCRIPTORS[4],
            OperatorKind::AsDatetime { .. } => &DESCRIPTORS[5],
            OperatorKind::Split { .. } => &DESCRIPTORS[6],
            OperatorKind::ToUppercase => &DESCRIPTORS[7],
            OperatorKind::ToLowercase => &DESCRIPTORS[8],
            OperatorKind::Index { .. } => &DESCRIPTORS[9],
            OperatorKind::GetKey { .. } => &DESCRIPTORS[10],
            OperatorKind::Len => &DESCRIPTORS[11],
            OperatorKind::MapHost { .. } => &DESCRIPTORS[12],
            OperatorKind::JsonDecode => &DESCRIPTORS[13],
        }
    }
}

/// Run one operator on `value`.
pub(crate) fn dispatch(op: &OperatorKind, value: Value) -> StepResult<Value> {
    match op {
        OperatorKind::AssertStr => apply::coerce::assert_str(value),
        OperatorKind::ExpectStr => apply::coerce::expect_str(value),
        OperatorKind::AsInt => apply::coerce::as_int(value),
        OperatorKind::AsFloat => apply::coerce::as_float(value),
        OperatorKind::AsBool => apply::coerce::as_bool(value),
        OperatorKind::AsDatetime { format } => apply::coerce::as_datetime(value, format),
        OperatorKind::Split { delim } => apply::text::split(value, delim),
        OperatorKind::ToUppercase => apply::text::to_uppercase(value),
        OperatorKind::ToLowercase => apply::text::to_lowercase(value),
        OperatorKind::Index { idx } => apply::seq::index(value, *idx),
        OperatorKind::GetKey { key } => apply::map::get(value, key),
        OperatorKind::Len => apply::core::len(value),
        OperatorKind::MapHost { func } => apply::core::map_host(value, func),
        OperatorKind::JsonDecode => apply::decode::json(value),
    }
}

/// Build an operator from its namespace, external name and plain
/// argument values.
pub fn construct(namespace: &str, name: &str, params: &[Value]) -> StepResult<Operator> {
    match (namespace, name) {
        ("coerce", "assert_str") => {
            args::arity(namespace, name, params, 0)?;
            Ok(OperatorKind::AssertStr.into())
        }
        ("coerce", "expect_str") => {
            args::arity(namespace, name, params, 0)?;
            Ok(OperatorKind::ExpectStr.into())
        }
        ("coerce", "as_int") => {
            args::arity(namespace, name, params, 0)?;
            Ok(OperatorKind::AsInt.into())
        }
        ("coerce", "as_float") => {
            args::arity(namespace, name, params, 0)?;
            Ok(OperatorKind::AsFloat.into())
        }
        ("coerce", "as_bool") => {
            args::arity(namespace, name, params, 0)?;
            Ok(OperatorKind::AsBool.into())
        }
        ("coerce", "as_datetime") => {
            args::arity(namespace, name, params, 1)?;
            Ok(OperatorKind::AsDatetime {
                format: args::param(params, 0, "format")?,
            }
            .into())
        }
        ("text", "split") => {
            args::arity(namespace, name, params, 1)?;
            Ok(OperatorKind::Split {
                delim: args::param(params, 0, "delim")?,
            }
            .into())
        }
        ("text", "to_uppercase") => {
            args::arity(namespace, name, params, 0)?;
            Ok(OperatorKind::ToUppercase.into())
        }
        ("text", "to_lowercase") => {
            args::arity(namespace, name, params, 0)?;
            Ok(OperatorKind::ToLowercase.into())
        }
        ("seq", "index") | ("text", "index") => {
            args::arity(namespace, name, params, 1)?;
            Ok(OperatorKind::Index {
                idx: args::param(params, 0, "idx")?,
            }
            .into())
        }
        ("map", "get") => {
            args::arity(namespace, name, params, 1)?;
            Ok(OperatorKind::GetKey {
                key: args::param(params, 0, "key")?,
            }
            .into())
        }
        ("core", "len") | ("text", "len") => {
            args::arity(namespace, name, params, 0)?;
            Ok(OperatorKind::Len.into())
        }
        ("core", "map_host") => Err(args::not_constructible(namespace, name)),
        ("decode", "json") => {
            args::arity(namespace, name, params, 0)?;
            Ok(OperatorKind::JsonDecode.into())
        }
        _ => Err(args::unknown_operator(namespace, name)),
    }
}

/// Type assertions and coercions.
pub mod coerce {
    use super::{Operator, OperatorKind};

    /// Fail unless the value is text.
    pub fn assert_str() -> Operator {
        OperatorKind::AssertStr.into()
    }

    /// Narrow the value to text, failing on anything else.
    pub fn expect_str() -> Operator {
        OperatorKind::ExpectStr.into()
    }

    /// Coerce text, numbers and booleans to an integer.
    pub fn as_int() -> Operator {
        OperatorKind::AsInt.into()
    }

    /// Coerce text and numbers to a float.
    pub fn as_float() -> Operator {
        OperatorKind::AsFloat.into()
    }

    /// Coerce text, integers and booleans to a boolean.
    pub fn as_bool() -> Operator {
        OperatorKind::AsBool.into()
    }

    /// Parse text with a strftime-style format into RFC 3339 text.
    pub fn as_datetime(format: impl Into<String>) -> Operator {
        OperatorKind::AsDatetime {
            format: format.into(),
        }
        .into()
    }
}

/// Text operations.
pub mod text {
    use super::{Operator, OperatorKind};

    /// Split text on a non-empty delimiter.
    pub fn split(delim: impl Into<String>) -> Operator {
        OperatorKind::Split {
            delim: delim.into(),
        }
        .into()
    }

    pub fn to_uppercase() -> Operator {
        OperatorKind::ToUppercase.into()
    }

    pub fn to_lowercase() -> Operator {
        OperatorKind::ToLowercase.into()
    }

    /// Item at a zero-based position.
    pub fn index(idx: i64) -> Operator {
        OperatorKind::Index { idx }.into()
    }

    /// Characters of text, items of a sequence or entries of a mapping.
    pub fn len() -> Operator {
        OperatorKind::Len.into()
    }
}

/// Sequence access.
pub mod seq {
    use super::{Operator, OperatorKind};

    /// Item at a zero-based position.
    pub fn index(idx: i64) -> Operator {
        OperatorKind::Index { idx }.into()
    }
}

/// Mapping access.
pub mod map {
    use super::{Operator, OperatorKind};

    /// Value stored under a key.
    pub fn get(key: impl Into<String>) -> Operator {
        OperatorKind::GetKey { key: key.into() }.into()
    }
}

/// Operations on any value.
pub mod core {
    use super::{HostCallback, Operator, OperatorKind};

    /// Characters of text, items of a sequence or entries of a mapping.
    pub fn len() -> Operator {
        OperatorKind::Len.into()
    }

    /// Hand the value to a host callback. Exceptions it raises become `py_exception` failures.
    pub fn map_host(func: HostCallback) -> Operator {
        OperatorKind::MapHost { func }.into()
    }
}

/// Decoders that turn text into structured values.
pub mod decode {
    use super::{Operator, OperatorKind};

    /// Decode JSON text.
    pub fn json() -> Operator {
        OperatorKind::JsonDecode.into()
    }
}

/// Every namespace under one root: `op::text::split(",")`.
pub mod op {
    pub use super::{coerce, core, decode, map, seq, text};
}
