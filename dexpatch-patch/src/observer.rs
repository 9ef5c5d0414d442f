//! Structured progress events.

use std::fmt;

use dexpatch_ir::Prototype;
use dexpatch_isa::Reg;

use crate::config::Target;

/// Identity of a method inside a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodId<'a> {
    pub class: &'a str,
    pub name: &'a str,
    pub prototype: &'a Prototype,
}

impl fmt::Display for MethodId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}(", self.class, self.name)?;
        for p in &self.prototype.parameters {
            f.write_str(p)?;
        }
        write!(f, "){}", self.prototype.return_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Abstract or native: there is no code to patch.
    NoImplementation,
    /// Declared with code but the decoder supplied none.
    MissingCode,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoImplementation => f.write_str("no implementation"),
            SkipReason::MissingCode => f.write_str("code item missing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchEvent<'a> {
    MethodMatched(MethodId<'a>),
    /// Every register was a parameter; the window grew to `registers`.
    RegisterAdded { method: MethodId<'a>, registers: u16 },
    /// A local register already existed and is reused.
    RegisterReused { method: MethodId<'a>, register: Reg },
    InstructionsShifted { method: MethodId<'a>, count: usize },
    PreambleInjected {
        method: MethodId<'a>,
        library: &'a str,
        register: Reg,
    },
    MethodSkipped {
        method: MethodId<'a>,
        reason: SkipReason,
    },
    /// The body's parameter register count disagrees with the prototype.
    /// The body's own numbers are used.
    ParameterCountMismatch {
        method: MethodId<'a>,
        declared: u16,
        expected: u32,
    },
    /// No method of the program matched this target.
    MethodNotFound(&'a Target),
}

/// Receives [`PatchEvent`]s as a program is patched.
pub trait PatchObserver: Send + Sync {
    fn on_event(&self, event: &PatchEvent<'_>);
}

impl<F> PatchObserver for F
where
    F: Fn(&PatchEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &PatchEvent<'_>) {
        self(event)
    }
}

/// Forwards events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl PatchObserver for LogObserver {
    fn on_event(&self, event: &PatchEvent<'_>) {
        match event {
            PatchEvent::MethodMatched(m) => log::debug!("Matched {m}"),
            PatchEvent::RegisterAdded { method, registers } => {
                log::debug!("{method}: no free local, growing to {registers} registers")
            }
            PatchEvent::RegisterReused { method, register } => {
                log::debug!("{method}: reusing local {register}")
            }
            PatchEvent::InstructionsShifted { method, count } => {
                log::debug!("{method}: shifted {count} instructions")
            }
            PatchEvent::PreambleInjected {
                method,
                library,
                register,
            } => log::info!("{method}: injected load of {library:?} via {register}"),
            PatchEvent::MethodSkipped { method, reason } => {
                log::warn!("Skipping {method}: {reason}")
            }
            PatchEvent::ParameterCountMismatch {
                method,
                declared,
                expected,
            } => log::warn!(
                "{method}: body declares {declared} parameter registers, prototype implies {expected}"
            ),
            PatchEvent::MethodNotFound(target) => log::warn!("No method matches {target}"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PatchObserver for NoopObserver {
    fn on_event(&self, _event: &PatchEvent<'_>) {}
}
