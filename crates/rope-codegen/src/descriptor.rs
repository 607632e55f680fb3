//! In-memory registry produced by the front end and consumed by the emitters.

use serde::Serialize;

use crate::signature::TypeExpr;

/// A namespace declared on the registry enum. Each one becomes a constructor
/// group on the native surface and a class on the typed surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceDecl {
    pub name: String,
    pub description: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Str,
    Int,
    Float,
    Bool,
    /// A host callback. Only escape-hatch operators may take one.
    Callable,
}

impl ParamType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "str" => Some(ParamType::Str),
            "int" => Some(ParamType::Int),
            "float" => Some(ParamType::Float),
            "bool" => Some(ParamType::Bool),
            "callable" => Some(ParamType::Callable),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            ParamType::Str => "str",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::Callable => "callable",
        }
    }

    /// The field type the registry variant must declare for this parameter.
    pub fn rust_field_type(&self) -> &'static str {
        match self {
            ParamType::Str => "String",
            ParamType::Int => "i64",
            ParamType::Float => "f64",
            ParamType::Bool => "bool",
            ParamType::Callable => "HostCallback",
        }
    }

    /// Argument type of the generated constructor.
    pub(crate) fn constructor_arg(&self) -> &'static str {
        match self {
            ParamType::Str => "impl Into<String>",
            other => other.rust_field_type(),
        }
    }

    /// Expression turning the constructor argument into the field value.
    pub(crate) fn constructor_value(&self, name: &str) -> String {
        match self {
            ParamType::Str => format!("{name}.into()"),
            _ => name.to_string(),
        }
    }

    /// Expression passing the bound field (a reference) to the implementation.
    pub(crate) fn dispatch_arg(&self, name: &str) -> String {
        match self {
            ParamType::Int | ParamType::Float | ParamType::Bool => format!("*{name}"),
            ParamType::Str | ParamType::Callable => name.to_string(),
        }
    }

    /// Parameter type on the typed surface.
    pub(crate) fn stub_type(&self) -> &'static str {
        match self {
            ParamType::Callable => "Callable[[object], object]",
            other => other.as_tag(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDescriptor {
    pub name: String,
    pub ty: ParamType,
}

/// One registry entry: a declared operator and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorDescriptor {
    pub internal_name: String,
    pub external_name: String,
    pub namespace: String,
    /// Extra namespaces the operator is also exported under.
    pub aliases: Vec<String>,
    pub input: TypeExpr,
    pub output: TypeExpr,
    pub params: Vec<ParamDescriptor>,
    pub escape: bool,
    pub doc: Option<String>,
    pub line: usize,
}

impl OperatorDescriptor {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.external_name)
    }

    /// Primary namespace followed by aliases.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.namespace.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn exported_in(&self, namespace: &str) -> bool {
        self.namespaces().any(|ns| ns == namespace)
    }

    /// Operators taking a host callback cannot be built from plain values.
    pub fn is_constructible(&self) -> bool {
        self.params.iter().all(|p| p.ty != ParamType::Callable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registry {
    pub namespaces: Vec<NamespaceDecl>,
    pub operators: Vec<OperatorDescriptor>,
}

impl Registry {
    pub fn operator(&self, internal_name: &str) -> Option<&OperatorDescriptor> {
        self.operators.iter().find(|op| op.internal_name == internal_name)
    }

    /// Operators exported under `namespace`, in declaration order.
    pub fn exported_in<'a>(&'a self, namespace: &'a str) -> impl Iterator<Item = &'a OperatorDescriptor> {
        self.operators.iter().filter(move |op| op.exported_in(namespace))
    }

    pub fn has_callable_params(&self) -> bool {
        self.operators.iter().any(|op| !op.is_constructible())
    }
}
