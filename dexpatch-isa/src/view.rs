//! Read-only capability views over an instruction.
//!
//! A format is a fixed combination of capabilities; each trait exposes one
//! operand group and returns `None` when the instruction's shape does not
//! carry it.

use crate::format::{Capabilities, Format, RegisterLayout};
use crate::instruction::Instruction;
use crate::opcode::Opcode;
use crate::operands::{Literal, Reg, TableIndex};
use crate::reference::Reference;

/// Identity and length of an instruction.
pub trait InstructionView {
    fn opcode(&self) -> Opcode;

    fn code_units(&self) -> usize;

    fn format(&self) -> Format {
        self.opcode().format()
    }

    fn capabilities(&self) -> Capabilities {
        self.format().capabilities()
    }
}

/// Register operands.
pub trait RegisterOperands: InstructionView {
    /// Registers the instruction addresses, in slot order.
    fn registers(&self) -> Vec<Reg>;

    fn register_layout(&self) -> RegisterLayout {
        self.format().register_layout()
    }
}

pub trait LiteralOperand {
    fn literal(&self) -> Option<Literal>;
}

pub trait ReferenceOperands {
    fn reference(&self) -> Option<&Reference>;

    /// Second reference (the prototype of invoke-polymorphic).
    fn reference2(&self) -> Option<&Reference>;
}

pub trait BranchOperand {
    /// Relative branch displacement in code units.
    fn branch_offset(&self) -> Option<i32>;
}

pub trait TableIndexOperand {
    fn table_index(&self) -> Option<TableIndex>;
}

impl InstructionView for Instruction {
    #[inline]
    fn opcode(&self) -> Opcode {
        self.opcode
    }

    #[inline]
    fn code_units(&self) -> usize {
        self.size_in_code_units()
    }
}

impl RegisterOperands for Instruction {
    fn registers(&self) -> Vec<Reg> {
        self.operands.registers()
    }
}

impl LiteralOperand for Instruction {
    fn literal(&self) -> Option<Literal> {
        self.operands.literal()
    }
}

impl ReferenceOperands for Instruction {
    fn reference(&self) -> Option<&Reference> {
        self.operands.reference()
    }

    fn reference2(&self) -> Option<&Reference> {
        self.operands.reference2()
    }
}

impl BranchOperand for Instruction {
    fn branch_offset(&self) -> Option<i32> {
        self.operands.branch_offset()
    }
}

impl TableIndexOperand for Instruction {
    fn table_index(&self) -> Option<TableIndex> {
        self.operands.table_index()
    }
}
