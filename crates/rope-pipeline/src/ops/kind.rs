//! The operator registry.
//!
//! Every operator is declared here exactly once. `rope generate` reads the
//! annotations below and writes `generated.rs` and `stubs/ops.pyi`; adding an
//! operator means adding a variant here plus its implementation under
//! `apply/`.

use crate::host::HostCallback;

/// Closed set of pipeline operators.
///
/// @namespace coerce "Type assertions and coercions."
/// @namespace text "Text operations."
/// @namespace seq "Sequence access."
/// @namespace map "Mapping access."
/// @namespace core "Operations on any value."
/// @namespace decode "Decoders that turn text into structured values."
#[derive(Debug, Clone)]
pub enum OperatorKind {
    /// Fail unless the value is text.
    /// @op name=assert_str
    /// @sig in=object out=str
    /// @ns coerce
    AssertStr,

    /// Narrow the value to text, failing on anything else.
    /// @op name=expect_str
    /// @sig in=object out=str
    /// @ns coerce
    ExpectStr,

    /// Coerce text, numbers and booleans to an integer.
    /// @op name=as_int
    /// @sig in=object out=int
    /// @ns coerce
    AsInt,

    /// Coerce text and numbers to a float.
    /// @op name=as_float
    /// @sig in=object out=float
    /// @ns coerce
    AsFloat,

    /// Coerce text, integers and booleans to a boolean.
    /// @op name=as_bool
    /// @sig in=object out=bool
    /// @ns coerce
    AsBool,

    /// Parse text with a strftime-style format into RFC 3339 text.
    /// @op name=as_datetime
    /// @sig in=object out=str
    /// @ns coerce
    /// @param format:str
    AsDatetime { format: String },

    /// Split text on a non-empty delimiter.
    /// @op name=split
    /// @sig in=str out=list[str]
    /// @ns text
    /// @param delim:str
    Split { delim: String },

    /// @op name=to_uppercase
    /// @sig in=str out=str
    /// @ns text
    ToUppercase,

    /// @op name=to_lowercase
    /// @sig in=str out=str
    /// @ns text
    ToLowercase,

    /// Item at a zero-based position.
    /// @op name=index
    /// @sig in=Sequence[object] out=object
    /// @ns seq
    /// @alias text
    /// @param idx:int
    Index { idx: i64 },

    /// Value stored under a key.
    /// @op name=get
    /// @sig in=Mapping[str, object] out=object
    /// @ns map
    /// @param key:str
    GetKey { key: String },

    /// Characters of text, items of a sequence or entries of a mapping.
    /// @op name=len
    /// @sig in=object out=int
    /// @ns core
    /// @alias text
    Len,

    /// Hand the value to a host callback. Exceptions it raises become
    /// `py_exception` failures.
    /// @op name=map_host
    /// @sig in=object out=object
    /// @ns core
    /// @param func:callable
    /// @escape
    MapHost { func: HostCallback },

    /// Decode JSON text.
    /// @op name=json
    /// @sig in=str out=object
    /// @ns decode
    JsonDecode,
}
