//! Dalvik instruction set model.
//!
//! This crate describes decoded Dalvik instructions: the closed set of
//! instruction [`Format`]s, the [`Opcode`]s that use them, and the operand
//! groups ([`Operands`]) a decoder attaches to each instruction. It does not
//! read or write bytecode; that is left to an external codec.

pub mod format;
pub mod instruction;
pub mod opcode;
pub mod operands;
pub mod reference;
pub mod view;

mod display;

pub use format::{Capabilities, Format, RegWidth, RegisterLayout};
pub use instruction::{Instruction, code_units_of};
pub use opcode::{Opcode, UnknownOpcode};
pub use operands::{ArgList, Literal, OperandShape, Operands, Reg, RegRange, SwitchCase, TableIndex};
pub use reference::{FieldRef, MethodRef, ProtoRef, Reference, ReferenceType};
pub use view::{
    BranchOperand, InstructionView, LiteralOperand, ReferenceOperands, RegisterOperands,
    TableIndexOperand,
};
