use serde::{Deserialize, Serialize};

use crate::format::Format;
use crate::opcode::Opcode;
use crate::operands::{OperandShape, Operands};

/// A decoded instruction: an opcode and the operand groups of its format.
///
/// Nothing forces `operands` to have the shape `opcode.format()` requires;
/// a decoder that gets this wrong produces an instruction for which
/// [`Instruction::is_well_formed`] is `false`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Operands,
}

impl Instruction {
    #[inline]
    pub fn new(opcode: Opcode, operands: Operands) -> Self {
        Self { opcode, operands }
    }

    /// The operand shape the opcode's format requires.
    #[inline]
    pub fn expected_shape(&self) -> OperandShape {
        self.opcode.format().operand_shape()
    }

    /// Whether the carried operands match the format.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.operands.shape() == self.expected_shape()
    }

    /// Length in 16-bit code units. Fixed by the format, except for payload
    /// pseudo-instructions whose length follows their table size.
    pub fn size_in_code_units(&self) -> usize {
        match self.opcode.format().code_units() {
            Some(units) => units as usize,
            None => self.operands.payload_code_units().unwrap_or(0),
        }
    }

    #[inline]
    pub fn format(&self) -> Format {
        self.opcode.format()
    }
}

/// Total length in code units of an instruction sequence, i.e. the
/// `insns_size` of a code item holding it.
pub fn code_units_of<'a>(instructions: impl IntoIterator<Item = &'a Instruction>) -> usize {
    instructions
        .into_iter()
        .map(Instruction::size_in_code_units)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operands::{Literal, Reg};
    use crate::reference::Reference;

    #[test]
    fn well_formed_detection() {
        let good = Instruction::new(
            Opcode::Move,
            Operands::Two {
                a: Reg(0),
                b: Reg(1),
            },
        );
        assert!(good.is_well_formed());

        let bad = Instruction::new(Opcode::Move, Operands::One { a: Reg(0) });
        assert!(!bad.is_well_formed());
        assert_eq!(bad.expected_shape(), OperandShape::Two);
    }

    #[test]
    fn sizes() {
        let const_wide = Instruction::new(
            Opcode::ConstWide,
            Operands::OneLiteral {
                a: Reg(0),
                literal: Literal::Wide(1 << 40),
            },
        );
        assert_eq!(const_wide.size_in_code_units(), 5);

        let const_string = Instruction::new(
            Opcode::ConstString,
            Operands::OneReference {
                a: Reg(0),
                reference: Reference::String("gadget".into()),
            },
        );
        assert_eq!(const_string.size_in_code_units(), 2);
        assert_eq!(code_units_of([&const_wide, &const_string]), 7);
    }
}
