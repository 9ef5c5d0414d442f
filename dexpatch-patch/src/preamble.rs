//! The injected library-loading preamble.

use dexpatch_isa::{ArgList, Instruction, MethodRef, Opcode, Operands, Reference, Reg, RegWidth};

use crate::error::ShiftError;

/// Register the preamble writes: `v0`, the lowest local once a free local
/// is guaranteed.
pub const PREAMBLE_REGISTER: Reg = Reg(0);

pub const DEFAULT_LIBRARY: &str = "gadget";

/// `Ljava/lang/System;->loadLibrary(Ljava/lang/String;)V`
pub fn default_loader() -> MethodRef {
    MethodRef::new(
        "Ljava/lang/System;",
        "loadLibrary",
        ["Ljava/lang/String;"],
        "V",
    )
}

/// Builds the two-instruction preamble:
///
/// ```text
/// const-string vN, "<library>"
/// invoke-static {vN}, <loader>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreambleBuilder {
    library: String,
    loader: MethodRef,
}

impl Default for PreambleBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LIBRARY)
    }
}

impl PreambleBuilder {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            loader: default_loader(),
        }
    }

    pub fn with_loader(mut self, loader: MethodRef) -> Self {
        self.loader = loader;
        self
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn loader(&self) -> &MethodRef {
        &self.loader
    }

    /// Build the preamble addressed at `target`. The argument slot of
    /// `invoke-static` is four bits wide, so `target` must be `v0..=v15`.
    pub fn build(&self, target: Reg) -> Result<[Instruction; 2], ShiftError> {
        if !RegWidth::Nibble.fits(target.0 as u32) {
            return Err(ShiftError::RegisterOverflow {
                opcode: Opcode::InvokeStatic,
                register: target.0 as u32,
                width: RegWidth::Nibble.bits(),
            });
        }

        Ok(self.emit(target))
    }

    fn emit(&self, target: Reg) -> [Instruction; 2] {
        let load = Instruction::new(
            Opcode::ConstString,
            Operands::OneReference {
                a: target,
                reference: Reference::String(self.library.clone()),
            },
        );
        let mut registers = [Reg(0); 5];
        registers[0] = target;
        let call = Instruction::new(
            Opcode::InvokeStatic,
            Operands::Invoke {
                args: ArgList {
                    count: 1,
                    registers,
                },
                reference: Reference::Method(self.loader.clone()),
            },
        );
        [load, call]
    }
}

/// Preamble for `library` at [`PREAMBLE_REGISTER`] with the default loader.
pub fn build_preamble(library: &str) -> [Instruction; 2] {
    PreambleBuilder::new(library).emit(PREAMBLE_REGISTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_listing() {
        let [load, call] = PreambleBuilder::default().build(PREAMBLE_REGISTER).unwrap();
        assert_eq!(load.to_string(), "const-string v0, \"gadget\"");
        assert_eq!(
            call.to_string(),
            "invoke-static {v0}, Ljava/lang/System;->loadLibrary(Ljava/lang/String;)V"
        );
        assert!(load.is_well_formed() && call.is_well_formed());
    }

    #[test]
    fn custom_loader_and_register() {
        let loader = MethodRef::new("LLoader;", "load", ["Ljava/lang/String;"], "V");
        let [load, call] = PreambleBuilder::new("frida")
            .with_loader(loader.clone())
            .build(Reg(15))
            .unwrap();
        assert_eq!(load.operands.registers(), vec![Reg(15)]);
        assert_eq!(call.operands.registers(), vec![Reg(15)]);
        assert_eq!(call.operands.reference(), Some(&Reference::Method(loader)));
    }

    #[test]
    fn target_must_fit_argument_slot() {
        let err = PreambleBuilder::default().build(Reg(16)).unwrap_err();
        assert!(matches!(err, ShiftError::RegisterOverflow { register: 16, width: 4, .. }));
    }

    #[test]
    fn free_function_matches_builder() {
        let built = PreambleBuilder::new("x").build(PREAMBLE_REGISTER).unwrap();
        assert_eq!(build_preamble("x"), built);
    }
}
