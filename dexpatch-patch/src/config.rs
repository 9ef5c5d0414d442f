//! Patch configuration.

use std::fmt;
use std::path::Path;

use dexpatch_ir::{AccessFlags, MethodDef};
use dexpatch_isa::MethodRef;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::preamble::{DEFAULT_LIBRARY, default_loader};

/// What to do when no method matches the configured target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMethod {
    /// Return the program unmodified.
    #[default]
    Ignore,
    /// Fail with [`Error::MethodNotFound`].
    Error,
}

/// A class to patch and which of its methods to take.
///
/// Without a method name every constructor (`<init>`, `<clinit>`, flagged
/// `CONSTRUCTOR`) is selected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Class type descriptor, `Lpkg/Name;`.
    pub class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl Target {
    pub fn method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: Some(method.into()),
        }
    }

    pub fn constructors(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: None,
        }
    }

    pub fn selects(&self, def: &MethodDef) -> bool {
        match &self.method {
            Some(name) => def.name == *name,
            None => def.access_flags.contains(AccessFlags::CONSTRUCTOR),
        }
    }

    /// The method name, or `<constructor>` for the constructor selector.
    pub fn method_label(&self) -> &str {
        self.method.as_deref().unwrap_or(CONSTRUCTOR_LABEL)
    }
}

const CONSTRUCTOR_LABEL: &str = "<constructor>";

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.class, self.method_label())
    }
}

/// Which methods to patch and what the preamble loads.
///
/// ```yaml
/// targets:
///   - class: Lcom/example/MainActivity;
///     method: onCreate
///   - class: Lcom/example/App;
/// library: gadget
/// on_missing: error
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchConfig {
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default = "default_library")]
    pub library: String,
    #[serde(default = "default_loader")]
    pub loader: MethodRef,
    #[serde(default)]
    pub on_missing: MissingMethod,
}

fn default_library() -> String {
    DEFAULT_LIBRARY.to_string()
}

impl PatchConfig {
    /// A single named-method target.
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::with_targets(vec![Target::method(class, method)])
    }

    pub fn with_targets(targets: Vec<Target>) -> Self {
        Self {
            targets,
            library: default_library(),
            loader: default_loader(),
            on_missing: MissingMethod::default(),
        }
    }

    /// Parse a YAML document. The result is not validated, so that command
    /// line overrides can still fill in missing fields.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(Error::Config("no target class is set".into()));
        }
        for target in &self.targets {
            if !is_class_descriptor(&target.class) {
                return Err(Error::Config(format!(
                    "{:?} is not a class descriptor (expected Lpkg/Name;)",
                    target.class
                )));
            }
            if target.method.as_deref() == Some("") {
                return Err(Error::Config(format!(
                    "empty method name for {}",
                    target.class
                )));
            }
        }
        if self.library.is_empty() {
            return Err(Error::Config("library name is empty".into()));
        }
        if self.loader.parameters.len() != 1 {
            return Err(Error::Config(format!(
                "loader {} must take exactly one argument",
                self.loader
            )));
        }
        Ok(())
    }
}

fn is_class_descriptor(s: &str) -> bool {
    s.len() > 2 && s.starts_with('L') && s.ends_with(';')
}
