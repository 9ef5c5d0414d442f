//! Register renumbering of single instructions.
//!
//! Dispatch is on the operand group the instruction carries, after checking
//! it against the shape its opcode's format requires. Register fields are
//! validated against the field widths of that format so an index that no
//! longer fits is reported instead of being truncated by the encoder.

use dexpatch_isa::{
    ArgList, Instruction, Opcode, Operands, Reg, RegRange, RegWidth, RegisterLayout,
};

use crate::error::ShiftError;

/// Return `insn` with every register operand incremented by one.
///
/// Literals, references, branch offsets, table indices, the opcode and the
/// instruction length are carried over unchanged. Variadic argument lists
/// shift only their active prefix; ranges shift their base register.
pub fn shift_instruction(insn: &Instruction) -> Result<Instruction, ShiftError> {
    let format = insn.format();
    let expected = format.operand_shape();
    let found = insn.operands.shape();
    if expected != found {
        return Err(ShiftError::ShapeMismatch {
            opcode: insn.opcode,
            format,
            expected,
            found,
        });
    }

    let s = Shifter {
        opcode: insn.opcode,
        layout: format.register_layout(),
    };

    let operands = match &insn.operands {
        Operands::Nullary
        | Operands::Branch { .. }
        | Operands::VerificationError { .. }
        | Operands::ArrayData { .. }
        | Operands::PackedSwitch { .. }
        | Operands::SparseSwitch { .. } => return Ok(insn.clone()),

        Operands::One { a } => Operands::One { a: s.fixed(0, *a)? },
        Operands::OneLiteral { a, literal } => Operands::OneLiteral {
            a: s.fixed(0, *a)?,
            literal: *literal,
        },
        Operands::OneReference { a, reference } => Operands::OneReference {
            a: s.fixed(0, *a)?,
            reference: reference.clone(),
        },
        Operands::OneBranch { a, offset } => Operands::OneBranch {
            a: s.fixed(0, *a)?,
            offset: *offset,
        },

        Operands::Two { a, b } => Operands::Two {
            a: s.fixed(0, *a)?,
            b: s.fixed(1, *b)?,
        },
        Operands::TwoLiteral { a, b, literal } => Operands::TwoLiteral {
            a: s.fixed(0, *a)?,
            b: s.fixed(1, *b)?,
            literal: *literal,
        },
        Operands::TwoReference { a, b, reference } => Operands::TwoReference {
            a: s.fixed(0, *a)?,
            b: s.fixed(1, *b)?,
            reference: reference.clone(),
        },
        Operands::TwoIndexed { a, b, index } => Operands::TwoIndexed {
            a: s.fixed(0, *a)?,
            b: s.fixed(1, *b)?,
            index: *index,
        },
        Operands::TwoBranch { a, b, offset } => Operands::TwoBranch {
            a: s.fixed(0, *a)?,
            b: s.fixed(1, *b)?,
            offset: *offset,
        },

        Operands::Three { a, b, c } => Operands::Three {
            a: s.fixed(0, *a)?,
            b: s.fixed(1, *b)?,
            c: s.fixed(2, *c)?,
        },

        Operands::Invoke { args, reference } => Operands::Invoke {
            args: s.args(args)?,
            reference: reference.clone(),
        },
        Operands::InvokeIndexed { args, index } => Operands::InvokeIndexed {
            args: s.args(args)?,
            index: *index,
        },
        Operands::InvokePolymorphic {
            args,
            method,
            proto,
        } => Operands::InvokePolymorphic {
            args: s.args(args)?,
            method: method.clone(),
            proto: proto.clone(),
        },

        Operands::Range { range, reference } => Operands::Range {
            range: s.range(range)?,
            reference: reference.clone(),
        },
        Operands::RangeIndexed { range, index } => Operands::RangeIndexed {
            range: s.range(range)?,
            index: *index,
        },
        Operands::RangePolymorphic {
            range,
            method,
            proto,
        } => Operands::RangePolymorphic {
            range: s.range(range)?,
            method: method.clone(),
            proto: proto.clone(),
        },
    };

    Ok(Instruction::new(insn.opcode, operands))
}

struct Shifter {
    opcode: Opcode,
    layout: RegisterLayout,
}

impl Shifter {
    fn bump(&self, reg: Reg, width: RegWidth) -> Result<Reg, ShiftError> {
        let shifted = reg.0 as u32 + 1;
        if !width.fits(shifted) {
            return Err(ShiftError::RegisterOverflow {
                opcode: self.opcode,
                register: shifted,
                width: width.bits(),
            });
        }
        Ok(Reg(shifted as u16))
    }

    /// Shift the fixed register slot `slot` (0 = A, 1 = B, 2 = C).
    fn fixed(&self, slot: usize, reg: Reg) -> Result<Reg, ShiftError> {
        let width = match self.layout {
            RegisterLayout::Fixed(widths) => widths.get(slot).copied(),
            _ => None,
        }
        .unwrap_or(RegWidth::Word);
        self.bump(reg, width)
    }

    fn args(&self, args: &ArgList) -> Result<ArgList, ShiftError> {
        let count = args.count as usize;
        if count > RegisterLayout::MAX_VARIADIC {
            return Err(ShiftError::ArgCount {
                opcode: self.opcode,
                count: args.count,
            });
        }
        let mut out = *args;
        for reg in &mut out.registers[..count] {
            *reg = self.bump(*reg, RegWidth::Nibble)?;
        }
        Ok(out)
    }

    fn range(&self, range: &RegRange) -> Result<RegRange, ShiftError> {
        let shifted = RegRange {
            start: self.bump(range.start, RegWidth::Word)?,
            count: range.count,
        };
        match shifted.last() {
            Some(last) if !RegWidth::Word.fits(last) => Err(ShiftError::RegisterOverflow {
                opcode: self.opcode,
                register: last,
                width: RegWidth::Word.bits(),
            }),
            _ => Ok(shifted),
        }
    }
}
