//! Locating target methods and splicing in the preamble.

use std::collections::HashSet;

use dexpatch_ir::{MethodBody, MethodDef, Program, Prototype};
use serde::Serialize;

use crate::budget::needs_extra_register;
use crate::codec::{ProgramDecoder, ProgramEncoder};
use crate::config::{MissingMethod, PatchConfig, Target};
use crate::error::{Error, Result};
use crate::observer::{LogObserver, MethodId, PatchEvent, PatchObserver, SkipReason};
use crate::preamble::{PREAMBLE_REGISTER, PreambleBuilder};
use crate::transform::transform;

/// Summary of one patched method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchedMethod {
    pub class: String,
    pub name: String,
    pub prototype: Prototype,
    pub registers_before: u16,
    pub registers_after: u16,
    /// Whether the register window had to grow.
    pub added_register: bool,
    /// Instructions renumbered (zero when a local was reused).
    pub shifted: usize,
    pub code_units_before: usize,
    pub code_units_after: usize,
}

#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub program: Program,
    pub patched: Vec<PatchedMethod>,
}

impl PatchOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.patched.is_empty()
    }
}

/// Applies a [`PatchConfig`] to decoded programs.
pub struct Patcher {
    config: PatchConfig,
    preamble: PreambleBuilder,
    observer: Box<dyn PatchObserver>,
}

impl Patcher {
    /// Validates `config`; events go to [`LogObserver`] until replaced.
    pub fn new(config: PatchConfig) -> Result<Self> {
        config.validate()?;
        let preamble =
            PreambleBuilder::new(config.library.clone()).with_loader(config.loader.clone());
        Ok(Self {
            config,
            preamble,
            observer: Box::new(LogObserver),
        })
    }

    pub fn with_observer(mut self, observer: impl PatchObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    /// Patch every method each target selects, overloads included. A method
    /// selected by more than one target is patched once. The input program
    /// is left untouched.
    pub fn patch_program(&self, program: &Program) -> Result<PatchOutcome> {
        let mut out = program.clone();
        let mut patched = Vec::new();
        let mut done = HashSet::new();

        for target in &self.config.targets {
            if self.patch_target(&mut out, target, &mut done, &mut patched)? {
                continue;
            }
            self.observer.on_event(&PatchEvent::MethodNotFound(target));
            if self.config.on_missing == MissingMethod::Error {
                return Err(Error::MethodNotFound {
                    class: target.class.clone(),
                    method: target.method_label().to_string(),
                });
            }
        }

        Ok(PatchOutcome {
            program: out,
            patched,
        })
    }

    /// Patch the methods `target` selects; returns whether any matched.
    fn patch_target(
        &self,
        program: &mut Program,
        target: &Target,
        done: &mut HashSet<(usize, usize)>,
        patched: &mut Vec<PatchedMethod>,
    ) -> Result<bool> {
        let mut matched = false;

        for (ci, class) in program
            .classes
            .iter_mut()
            .enumerate()
            .filter(|(_, c)| c.descriptor == target.class)
        {
            for (mi, def) in class
                .methods
                .iter_mut()
                .enumerate()
                .filter(|(_, m)| target.selects(m))
            {
                matched = true;
                if !done.insert((ci, mi)) {
                    continue;
                }
                let id = MethodId {
                    class: &class.descriptor,
                    name: &def.name,
                    prototype: &def.prototype,
                };
                self.observer.on_event(&PatchEvent::MethodMatched(id));

                let Some(body) = &def.implementation else {
                    let reason = if def.access_flags.lacks_code() {
                        SkipReason::NoImplementation
                    } else {
                        SkipReason::MissingCode
                    };
                    self.observer
                        .on_event(&PatchEvent::MethodSkipped { method: id, reason });
                    continue;
                };
                self.check_parameter_count(id, def, body);

                let (body, summary) = self.patch_method(id, body)?;
                def.implementation = Some(body);
                patched.push(summary);
            }
        }

        Ok(matched)
    }

    /// Decoders derive the parameter count from the prototype; a body that
    /// disagrees is patched on its own numbers.
    fn check_parameter_count(&self, id: MethodId<'_>, def: &MethodDef, body: &MethodBody) {
        let expected = def.parameter_register_count();
        if expected != body.parameter_registers as u32 {
            self.observer.on_event(&PatchEvent::ParameterCountMismatch {
                method: id,
                declared: body.parameter_registers,
                expected,
            });
        }
    }

    /// Transform one body and prepend the preamble.
    pub fn patch_method(
        &self,
        id: MethodId<'_>,
        body: &MethodBody,
    ) -> Result<(MethodBody, PatchedMethod)> {
        if body.parameter_registers > body.registers {
            return Err(Error::InconsistentRegisters {
                class: id.class.to_string(),
                method: id.name.to_string(),
                registers: body.registers,
                parameters: body.parameter_registers,
            });
        }

        let added = needs_extra_register(body.registers, body.parameter_registers);
        let mut out = transform(body)?;
        if added {
            self.observer.on_event(&PatchEvent::RegisterAdded {
                method: id,
                registers: out.registers,
            });
            self.observer.on_event(&PatchEvent::InstructionsShifted {
                method: id,
                count: out.instructions.len(),
            });
        } else {
            self.observer.on_event(&PatchEvent::RegisterReused {
                method: id,
                register: PREAMBLE_REGISTER,
            });
        }

        let preamble = self
            .preamble
            .build(PREAMBLE_REGISTER)
            .map_err(|e| Error::from_shift(0, e))?;
        out.instructions = preamble
            .into_iter()
            .chain(std::mem::take(&mut out.instructions))
            .collect();
        self.observer.on_event(&PatchEvent::PreambleInjected {
            method: id,
            library: self.preamble.library(),
            register: PREAMBLE_REGISTER,
        });

        let summary = PatchedMethod {
            class: id.class.to_string(),
            name: id.name.to_string(),
            prototype: id.prototype.clone(),
            registers_before: body.registers,
            registers_after: out.registers,
            added_register: added,
            shifted: if added { body.instructions.len() } else { 0 },
            code_units_before: body.code_units(),
            code_units_after: out.code_units(),
        };
        Ok((out, summary))
    }

    /// Decode `bytes`, patch, and re-encode.
    pub fn patch_image<D, E>(
        &self,
        decoder: &D,
        encoder: &E,
        bytes: &[u8],
    ) -> Result<(Vec<u8>, Vec<PatchedMethod>)>
    where
        D: ProgramDecoder + ?Sized,
        E: ProgramEncoder + ?Sized,
    {
        let program = decoder
            .decode(bytes)
            .map_err(|e| Error::Codec(format!("decode: {e}")))?;
        let outcome = self.patch_program(&program)?;
        let image = encoder
            .encode(&outcome.program)
            .map_err(|e| Error::Codec(format!("encode: {e}")))?;
        Ok((image, outcome.patched))
    }
}

/// Patch `program` with `config`, logging events.
pub fn patch_program(program: &Program, config: PatchConfig) -> Result<PatchOutcome> {
    Patcher::new(config)?.patch_program(program)
}
