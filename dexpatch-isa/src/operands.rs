//! Operand groups carried by decoded instructions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::Capabilities;
use crate::reference::Reference;

/// A virtual register index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reg(pub u16);

impl Reg {
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl From<u16> for Reg {
    #[inline]
    fn from(v: u16) -> Self {
        Reg(v)
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A literal operand. Narrow literals come from 11n/21s/21ih/22b/22s/31i,
/// wide ones from 21lh/51l and the `const-wide/*` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(tag = "width", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Narrow(i32),
    Wide(i64),
}

impl Literal {
    /// The literal widened to 64 bits.
    #[inline]
    pub const fn as_i64(self) -> i64 {
        match self {
            Literal::Narrow(v) => v as i64,
            Literal::Wide(v) => v,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self {
            Literal::Narrow(_) => "",
            Literal::Wide(_) => "L",
        };
        let v = self.as_i64();
        if v < 0 {
            write!(f, "-{:#x}{suffix}", v.unsigned_abs())
        } else {
            write!(f, "{v:#x}{suffix}")
        }
    }
}

/// An index into a runtime table rather than into the constant pool
/// (odex-only formats 22cs, 35mi/3rmi and 35ms/3rms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(tag = "table", content = "index", rename_all = "snake_case")]
pub enum TableIndex {
    Inline(u16),
    Vtable(u16),
    FieldOffset(u16),
}

impl fmt::Display for TableIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIndex::Inline(i) => write!(f, "inline@{i:#x}"),
            TableIndex::Vtable(i) => write!(f, "vtable@{i:#x}"),
            TableIndex::FieldOffset(i) => write!(f, "field@{i:#x}"),
        }
    }
}

/// Argument registers of a 35c-style instruction.
///
/// Only the first `count` slots (C, D, E, F, G in that order) are read by the
/// runtime; trailing slots are padding and conventionally zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize)]
pub struct ArgList {
    pub count: u8,
    pub registers: [Reg; 5],
}

impl ArgList {
    /// Build an argument list with zeroed padding. Returns `None` for more
    /// than five registers.
    pub fn new(args: &[Reg]) -> Option<Self> {
        if args.len() > 5 {
            return None;
        }
        let mut registers = [Reg(0); 5];
        registers[..args.len()].copy_from_slice(args);
        Some(Self {
            count: args.len() as u8,
            registers,
        })
    }

    /// The active argument registers. A malformed count above five is
    /// clamped here; the shift dispatcher reports it instead.
    pub fn active(&self) -> &[Reg] {
        let n = (self.count as usize).min(self.registers.len());
        &self.registers[..n]
    }
}

/// Register window of a 3rc-style instruction: `[start, start + count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize)]
pub struct RegRange {
    pub start: Reg,
    pub count: u8,
}

impl RegRange {
    /// Registers of the window, stopping at `v65535` for a window that runs
    /// past the register file.
    pub fn registers(&self) -> impl Iterator<Item = Reg> + '_ {
        let start = self.start.0 as u32;
        (start..start + self.count as u32).map_while(|r| u16::try_from(r).ok().map(Reg))
    }

    /// Last register in the window, or `None` when the window is empty.
    pub fn last(&self) -> Option<u32> {
        (self.count > 0).then(|| self.start.0 as u32 + self.count as u32 - 1)
    }
}

/// One `key -> target` entry of a sparse-switch payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
pub struct SwitchCase {
    pub key: i32,
    pub target: i32,
}

/// Operand groups of a decoded instruction, one variant per operand shape.
///
/// Register slots are named after the Dalvik format descriptions (A, B, C).
/// Branch offsets are relative, in code units.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Operands {
    Nullary,
    Branch {
        offset: i32,
    },
    VerificationError {
        kind: u8,
        reference: Reference,
    },
    One {
        a: Reg,
    },
    OneLiteral {
        a: Reg,
        literal: Literal,
    },
    OneReference {
        a: Reg,
        reference: Reference,
    },
    OneBranch {
        a: Reg,
        offset: i32,
    },
    Two {
        a: Reg,
        b: Reg,
    },
    TwoLiteral {
        a: Reg,
        b: Reg,
        literal: Literal,
    },
    TwoReference {
        a: Reg,
        b: Reg,
        reference: Reference,
    },
    TwoIndexed {
        a: Reg,
        b: Reg,
        index: TableIndex,
    },
    TwoBranch {
        a: Reg,
        b: Reg,
        offset: i32,
    },
    Three {
        a: Reg,
        b: Reg,
        c: Reg,
    },
    Invoke {
        args: ArgList,
        reference: Reference,
    },
    InvokeIndexed {
        args: ArgList,
        index: TableIndex,
    },
    InvokePolymorphic {
        args: ArgList,
        method: Reference,
        proto: Reference,
    },
    Range {
        range: RegRange,
        reference: Reference,
    },
    RangeIndexed {
        range: RegRange,
        index: TableIndex,
    },
    RangePolymorphic {
        range: RegRange,
        method: Reference,
        proto: Reference,
    },
    ArrayData {
        element_width: u16,
        elements: Vec<i64>,
    },
    PackedSwitch {
        first_key: i32,
        targets: Vec<i32>,
    },
    SparseSwitch {
        cases: Vec<SwitchCase>,
    },
}

/// Discriminant of [`Operands`], used to check a decoded instruction against
/// the shape its format requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandShape {
    Nullary,
    Branch,
    VerificationError,
    One,
    OneLiteral,
    OneReference,
    OneBranch,
    Two,
    TwoLiteral,
    TwoReference,
    TwoIndexed,
    TwoBranch,
    Three,
    Invoke,
    InvokeIndexed,
    InvokePolymorphic,
    Range,
    RangeIndexed,
    RangePolymorphic,
    ArrayData,
    PackedSwitch,
    SparseSwitch,
}

impl OperandShape {
    /// Number of fixed register slots, `None` for variadic and range shapes.
    pub const fn fixed_registers(self) -> Option<usize> {
        match self {
            OperandShape::Nullary
            | OperandShape::Branch
            | OperandShape::VerificationError
            | OperandShape::ArrayData
            | OperandShape::PackedSwitch
            | OperandShape::SparseSwitch => Some(0),
            OperandShape::One
            | OperandShape::OneLiteral
            | OperandShape::OneReference
            | OperandShape::OneBranch => Some(1),
            OperandShape::Two
            | OperandShape::TwoLiteral
            | OperandShape::TwoReference
            | OperandShape::TwoIndexed
            | OperandShape::TwoBranch => Some(2),
            OperandShape::Three => Some(3),
            OperandShape::Invoke
            | OperandShape::InvokeIndexed
            | OperandShape::InvokePolymorphic
            | OperandShape::Range
            | OperandShape::RangeIndexed
            | OperandShape::RangePolymorphic => None,
        }
    }

    pub const fn capabilities(self) -> Capabilities {
        const R: Capabilities = Capabilities::REGISTERS;
        const L: Capabilities = Capabilities::LITERAL;
        const REF: Capabilities = Capabilities::REFERENCE;
        const REF2: Capabilities = Capabilities::REFERENCE2;
        const B: Capabilities = Capabilities::BRANCH;
        const T: Capabilities = Capabilities::TABLE_INDEX;
        match self {
            OperandShape::Nullary => Capabilities::empty(),
            OperandShape::Branch => B,
            OperandShape::VerificationError => REF,
            OperandShape::One => R,
            OperandShape::OneLiteral => R.union(L),
            OperandShape::OneReference => R.union(REF),
            OperandShape::OneBranch => R.union(B),
            OperandShape::Two => R,
            OperandShape::TwoLiteral => R.union(L),
            OperandShape::TwoReference => R.union(REF),
            OperandShape::TwoIndexed => R.union(T),
            OperandShape::TwoBranch => R.union(B),
            OperandShape::Three => R,
            OperandShape::Invoke | OperandShape::Range => R.union(REF),
            OperandShape::InvokeIndexed | OperandShape::RangeIndexed => R.union(T),
            OperandShape::InvokePolymorphic | OperandShape::RangePolymorphic => {
                R.union(REF).union(REF2)
            }
            OperandShape::ArrayData | OperandShape::PackedSwitch | OperandShape::SparseSwitch => {
                Capabilities::PAYLOAD
            }
        }
    }
}

impl fmt::Display for OperandShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandShape::Nullary => "no",
            OperandShape::Branch => "branch",
            OperandShape::VerificationError => "verification-error",
            OperandShape::One => "one-register",
            OperandShape::OneLiteral => "register+literal",
            OperandShape::OneReference => "register+reference",
            OperandShape::OneBranch => "register+branch",
            OperandShape::Two => "two-register",
            OperandShape::TwoLiteral => "two-register+literal",
            OperandShape::TwoReference => "two-register+reference",
            OperandShape::TwoIndexed => "two-register+table-index",
            OperandShape::TwoBranch => "two-register+branch",
            OperandShape::Three => "three-register",
            OperandShape::Invoke => "argument-list+reference",
            OperandShape::InvokeIndexed => "argument-list+table-index",
            OperandShape::InvokePolymorphic => "argument-list+two-references",
            OperandShape::Range => "register-range+reference",
            OperandShape::RangeIndexed => "register-range+table-index",
            OperandShape::RangePolymorphic => "register-range+two-references",
            OperandShape::ArrayData => "array-data",
            OperandShape::PackedSwitch => "packed-switch",
            OperandShape::SparseSwitch => "sparse-switch",
        };
        f.write_str(name)
    }
}

impl Operands {
    pub const fn shape(&self) -> OperandShape {
        match self {
            Operands::Nullary => OperandShape::Nullary,
            Operands::Branch { .. } => OperandShape::Branch,
            Operands::VerificationError { .. } => OperandShape::VerificationError,
            Operands::One { .. } => OperandShape::One,
            Operands::OneLiteral { .. } => OperandShape::OneLiteral,
            Operands::OneReference { .. } => OperandShape::OneReference,
            Operands::OneBranch { .. } => OperandShape::OneBranch,
            Operands::Two { .. } => OperandShape::Two,
            Operands::TwoLiteral { .. } => OperandShape::TwoLiteral,
            Operands::TwoReference { .. } => OperandShape::TwoReference,
            Operands::TwoIndexed { .. } => OperandShape::TwoIndexed,
            Operands::TwoBranch { .. } => OperandShape::TwoBranch,
            Operands::Three { .. } => OperandShape::Three,
            Operands::Invoke { .. } => OperandShape::Invoke,
            Operands::InvokeIndexed { .. } => OperandShape::InvokeIndexed,
            Operands::InvokePolymorphic { .. } => OperandShape::InvokePolymorphic,
            Operands::Range { .. } => OperandShape::Range,
            Operands::RangeIndexed { .. } => OperandShape::RangeIndexed,
            Operands::RangePolymorphic { .. } => OperandShape::RangePolymorphic,
            Operands::ArrayData { .. } => OperandShape::ArrayData,
            Operands::PackedSwitch { .. } => OperandShape::PackedSwitch,
            Operands::SparseSwitch { .. } => OperandShape::SparseSwitch,
        }
    }

    /// Registers the instruction actually addresses: fixed slots in A, B, C
    /// order, the active prefix of an argument list, or every register of a
    /// range window.
    pub fn registers(&self) -> Vec<Reg> {
        match self {
            Operands::One { a }
            | Operands::OneLiteral { a, .. }
            | Operands::OneReference { a, .. }
            | Operands::OneBranch { a, .. } => vec![*a],
            Operands::Two { a, b }
            | Operands::TwoLiteral { a, b, .. }
            | Operands::TwoReference { a, b, .. }
            | Operands::TwoIndexed { a, b, .. }
            | Operands::TwoBranch { a, b, .. } => vec![*a, *b],
            Operands::Three { a, b, c } => vec![*a, *b, *c],
            Operands::Invoke { args, .. }
            | Operands::InvokeIndexed { args, .. }
            | Operands::InvokePolymorphic { args, .. } => args.active().to_vec(),
            Operands::Range { range, .. }
            | Operands::RangeIndexed { range, .. }
            | Operands::RangePolymorphic { range, .. } => range.registers().collect(),
            Operands::Nullary
            | Operands::Branch { .. }
            | Operands::VerificationError { .. }
            | Operands::ArrayData { .. }
            | Operands::PackedSwitch { .. }
            | Operands::SparseSwitch { .. } => Vec::new(),
        }
    }

    pub fn literal(&self) -> Option<Literal> {
        match self {
            Operands::OneLiteral { literal, .. } | Operands::TwoLiteral { literal, .. } => {
                Some(*literal)
            }
            _ => None,
        }
    }

    pub fn reference(&self) -> Option<&Reference> {
        match self {
            Operands::VerificationError { reference, .. }
            | Operands::OneReference { reference, .. }
            | Operands::TwoReference { reference, .. }
            | Operands::Invoke { reference, .. }
            | Operands::Range { reference, .. } => Some(reference),
            Operands::InvokePolymorphic { method, .. }
            | Operands::RangePolymorphic { method, .. } => Some(method),
            _ => None,
        }
    }

    pub fn reference2(&self) -> Option<&Reference> {
        match self {
            Operands::InvokePolymorphic { proto, .. }
            | Operands::RangePolymorphic { proto, .. } => Some(proto),
            _ => None,
        }
    }

    pub fn branch_offset(&self) -> Option<i32> {
        match self {
            Operands::Branch { offset }
            | Operands::OneBranch { offset, .. }
            | Operands::TwoBranch { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    pub fn table_index(&self) -> Option<TableIndex> {
        match self {
            Operands::TwoIndexed { index, .. }
            | Operands::InvokeIndexed { index, .. }
            | Operands::RangeIndexed { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Length in code units of a payload pseudo-instruction.
    pub(crate) fn payload_code_units(&self) -> Option<usize> {
        match self {
            // ident, element_width, size (2 units)
            Operands::ArrayData {
                element_width,
                elements,
            } => {
                let bytes = elements.len() * *element_width as usize;
                Some(4 + bytes.div_ceil(2))
            }
            // ident, size, first_key (2 units), targets (2 units each)
            Operands::PackedSwitch { targets, .. } => Some(4 + targets.len() * 2),
            // ident, size, keys and targets (2 units each)
            Operands::SparseSwitch { cases } => Some(2 + cases.len() * 4),
            _ => None,
        }
    }
}
