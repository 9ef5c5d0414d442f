//! Decoded program model: classes, their methods and method prototypes.

use serde::{Deserialize, Serialize};

use crate::method::MethodBody;
use crate::modifiers::AccessFlags;

/// A method signature without its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prototype {
    pub parameters: Vec<String>,
    pub return_type: String,
}

impl Prototype {
    pub fn new<I, P>(parameters: I, return_type: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
            return_type: return_type.into(),
        }
    }

    /// Registers needed to hold the arguments: two for each `J`/`D`
    /// parameter, one for every other, plus the implicit `this` of an
    /// instance method.
    pub fn parameter_register_count(&self, is_static: bool) -> u32 {
        let params: u32 = self
            .parameters
            .iter()
            .map(|p| if is_wide_descriptor(p) { 2 } else { 1 })
            .sum();
        if is_static { params } else { params + 1 }
    }
}

/// `J` (long) and `D` (double) occupy a register pair.
#[inline]
pub fn is_wide_descriptor(descriptor: &str) -> bool {
    matches!(descriptor, "J" | "D")
}

/// A method declaration and, unless abstract or native, its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub prototype: Prototype,
    #[serde(default)]
    pub access_flags: AccessFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<MethodBody>,
}

impl MethodDef {
    /// Parameter registers implied by the prototype and access flags.
    pub fn parameter_register_count(&self) -> u32 {
        self.prototype
            .parameter_register_count(self.access_flags.is_static())
    }
}

/// A class definition, identified by its type descriptor (`Lcom/example/Foo;`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub descriptor: String,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDef> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }
}

/// A decoded program (the class definitions of one dex image).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub classes: Vec<ClassDef>,
}

impl Program {
    pub fn class(&self, descriptor: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.descriptor == descriptor)
    }

    /// Iterate over every method together with its defining class.
    pub fn methods(&self) -> impl Iterator<Item = (&ClassDef, &MethodDef)> + '_ {
        self.classes
            .iter()
            .flat_map(|c| c.methods.iter().map(move |m| (c, m)))
    }
}
