//! Preamble injection for decoded Dalvik methods.
//!
//! A target method gets two instructions prepended that load a native
//! library by name:
//!
//! ```text
//! const-string v0, "gadget"
//! invoke-static {v0}, Ljava/lang/System;->loadLibrary(Ljava/lang/String;)V
//! ```
//!
//! `v0` must be a local. When every register of the method is a parameter,
//! all register operands are shifted up by one and the window grows by one
//! register, which frees `v0` while keeping parameters in the topmost slots.

pub mod budget;
pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod observer;
pub mod preamble;
pub mod shift;
pub mod transform;

pub use budget::needs_extra_register;
pub use codec::{ProgramDecoder, ProgramEncoder};
pub use config::{MissingMethod, PatchConfig, Target};
pub use driver::{PatchOutcome, PatchedMethod, Patcher, patch_program};
pub use error::{Error, Result, ShiftError};
pub use observer::{LogObserver, MethodId, NoopObserver, PatchEvent, PatchObserver, SkipReason};
pub use preamble::{PREAMBLE_REGISTER, PreambleBuilder, build_preamble, default_loader};
pub use shift::shift_instruction;
pub use transform::{diagnose, renumber, transform, transform_all};
