//! Symbolic constant-pool references.
//!
//! References are kept symbolic; resolving them to pool indices is the
//! encoder's job.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of constant an opcode refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceType {
    None,
    String,
    Type,
    Field,
    Method,
    CallSite,
    MethodProto,
    MethodHandle,
}

/// `Lclass;->name:Type`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
pub struct FieldRef {
    pub class: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

/// `Lclass;->name(Params)Return`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
pub struct MethodRef {
    pub class: String,
    pub name: String,
    pub parameters: Vec<String>,
    pub return_type: String,
}

impl MethodRef {
    pub fn new<I, P>(
        class: impl Into<String>,
        name: impl Into<String>,
        parameters: I,
        return_type: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            class: class.into(),
            name: name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
            return_type: return_type.into(),
        }
    }
}

/// `(Params)Return`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
pub struct ProtoRef {
    pub parameters: Vec<String>,
    pub return_type: String,
}

/// A symbolic reference operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reference {
    String(String),
    Type(String),
    Field(FieldRef),
    Method(MethodRef),
    CallSite(String),
    MethodProto(ProtoRef),
    MethodHandle(String),
}

impl Reference {
    pub fn kind(&self) -> ReferenceType {
        match self {
            Reference::String(_) => ReferenceType::String,
            Reference::Type(_) => ReferenceType::Type,
            Reference::Field(_) => ReferenceType::Field,
            Reference::Method(_) => ReferenceType::Method,
            Reference::CallSite(_) => ReferenceType::CallSite,
            Reference::MethodProto(_) => ReferenceType::MethodProto,
            Reference::MethodHandle(_) => ReferenceType::MethodHandle,
        }
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[String], ret: &str) -> fmt::Result {
    f.write_str("(")?;
    for p in params {
        f.write_str(p)?;
    }
    write!(f, "){ret}")
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.class, self.name)?;
        write_params(f, &self.parameters, &self.return_type)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}:{}", self.class, self.name, self.field_type)
    }
}

impl fmt::Display for ProtoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_params(f, &self.parameters, &self.return_type)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::String(s) => write!(f, "{s:?}"),
            Reference::Type(t) => f.write_str(t),
            Reference::Field(field) => fmt::Display::fmt(field, f),
            Reference::Method(method) => fmt::Display::fmt(method, f),
            Reference::CallSite(name) => f.write_str(name),
            Reference::MethodProto(proto) => fmt::Display::fmt(proto, f),
            Reference::MethodHandle(handle) => f.write_str(handle),
        }
    }
}
