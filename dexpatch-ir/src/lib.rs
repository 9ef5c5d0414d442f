//! Method bodies and the decoded-program model the patcher operates on.

pub mod method;
pub mod modifiers;
pub mod program;

pub use method::{DebugItem, DebugKind, ExceptionHandler, MethodBody, TryBlock};
pub use modifiers::AccessFlags;
pub use program::{ClassDef, MethodDef, Program, Prototype, is_wide_descriptor};
