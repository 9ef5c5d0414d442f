//! Dalvik instruction formats.
//!
//! Format names follow the Dalvik convention: the first digit is the length in
//! 16-bit code units, the second the number of registers, and the trailing
//! letter(s) the kind of extra operand (`x` none, `n`/`s`/`i`/`l`/`h` literal,
//! `t` branch, `c` constant-pool reference, `m` table index, `r` range).

use std::fmt;

use crate::operands::OperandShape;

bitflags::bitflags! {
    /// Operand groups a format can carry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const REGISTERS = 0x01;
        const LITERAL = 0x02;
        const REFERENCE = 0x04;
        const REFERENCE2 = 0x08;
        const BRANCH = 0x10;
        const TABLE_INDEX = 0x20;
        const PAYLOAD = 0x40;
    }
}

/// Width of a register field in the encoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RegWidth {
    /// 4-bit field, registers `v0..=v15`.
    Nibble = 4,
    /// 8-bit field, registers `v0..=v255`.
    Byte = 8,
    /// 16-bit field, registers `v0..=v65535`.
    Word = 16,
}

impl RegWidth {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Largest register index the field can hold.
    #[inline]
    pub const fn max(self) -> u16 {
        match self {
            RegWidth::Nibble => 0x0f,
            RegWidth::Byte => 0xff,
            RegWidth::Word => 0xffff,
        }
    }

    #[inline]
    pub const fn fits(self, register: u32) -> bool {
        register <= self.max() as u32
    }
}

/// How a format lays out its register operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterLayout {
    /// No register operands.
    None,
    /// A fixed number of named slots (A, B, C) with their field widths.
    Fixed(&'static [RegWidth]),
    /// Up to five 4-bit argument slots (C..G) plus an active count.
    Variadic,
    /// A 16-bit base register and an 8-bit count addressing `[base, base + count)`.
    Range,
}

impl RegisterLayout {
    /// Maximum number of active argument registers in a variadic list.
    pub const MAX_VARIADIC: usize = 5;
}

const NIBBLE: &[RegWidth] = &[RegWidth::Nibble];
const BYTE: &[RegWidth] = &[RegWidth::Byte];
const NIBBLE2: &[RegWidth] = &[RegWidth::Nibble, RegWidth::Nibble];
const BYTE2: &[RegWidth] = &[RegWidth::Byte, RegWidth::Byte];
const BYTE3: &[RegWidth] = &[RegWidth::Byte, RegWidth::Byte, RegWidth::Byte];
const BYTE_WORD: &[RegWidth] = &[RegWidth::Byte, RegWidth::Word];
const WORD2: &[RegWidth] = &[RegWidth::Word, RegWidth::Word];

/// The closed set of Dalvik instruction formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Format10t,
    Format10x,
    Format11n,
    Format11x,
    Format12x,
    Format20bc,
    Format20t,
    Format21c,
    Format21ih,
    Format21lh,
    Format21s,
    Format21t,
    Format22b,
    Format22c,
    Format22cs,
    Format22s,
    Format22t,
    Format22x,
    Format23x,
    Format30t,
    Format31c,
    Format31i,
    Format31t,
    Format32x,
    Format35c,
    Format35mi,
    Format35ms,
    Format3rc,
    Format3rmi,
    Format3rms,
    Format45cc,
    Format4rcc,
    Format51l,
    ArrayPayload,
    PackedSwitchPayload,
    SparseSwitchPayload,
}

impl Format {
    /// Every format, in declaration order.
    pub const ALL: &'static [Format] = &[
        Format::Format10t,
        Format::Format10x,
        Format::Format11n,
        Format::Format11x,
        Format::Format12x,
        Format::Format20bc,
        Format::Format20t,
        Format::Format21c,
        Format::Format21ih,
        Format::Format21lh,
        Format::Format21s,
        Format::Format21t,
        Format::Format22b,
        Format::Format22c,
        Format::Format22cs,
        Format::Format22s,
        Format::Format22t,
        Format::Format22x,
        Format::Format23x,
        Format::Format30t,
        Format::Format31c,
        Format::Format31i,
        Format::Format31t,
        Format::Format32x,
        Format::Format35c,
        Format::Format35mi,
        Format::Format35ms,
        Format::Format3rc,
        Format::Format3rmi,
        Format::Format3rms,
        Format::Format45cc,
        Format::Format4rcc,
        Format::Format51l,
        Format::ArrayPayload,
        Format::PackedSwitchPayload,
        Format::SparseSwitchPayload,
    ];

    /// Fixed length in 16-bit code units, or `None` for payload formats
    /// whose length depends on their contents.
    pub const fn code_units(self) -> Option<u16> {
        match self {
            Format::Format10t
            | Format::Format10x
            | Format::Format11n
            | Format::Format11x
            | Format::Format12x => Some(1),

            Format::Format20bc
            | Format::Format20t
            | Format::Format21c
            | Format::Format21ih
            | Format::Format21lh
            | Format::Format21s
            | Format::Format21t
            | Format::Format22b
            | Format::Format22c
            | Format::Format22cs
            | Format::Format22s
            | Format::Format22t
            | Format::Format22x
            | Format::Format23x => Some(2),

            Format::Format30t
            | Format::Format31c
            | Format::Format31i
            | Format::Format31t
            | Format::Format32x
            | Format::Format35c
            | Format::Format35mi
            | Format::Format35ms
            | Format::Format3rc
            | Format::Format3rmi
            | Format::Format3rms => Some(3),

            Format::Format45cc | Format::Format4rcc => Some(4),

            Format::Format51l => Some(5),

            Format::ArrayPayload | Format::PackedSwitchPayload | Format::SparseSwitchPayload => {
                None
            }
        }
    }

    pub const fn is_payload(self) -> bool {
        matches!(
            self,
            Format::ArrayPayload | Format::PackedSwitchPayload | Format::SparseSwitchPayload
        )
    }

    /// Register operand layout of this format.
    pub const fn register_layout(self) -> RegisterLayout {
        match self {
            Format::Format10t
            | Format::Format10x
            | Format::Format20bc
            | Format::Format20t
            | Format::Format30t
            | Format::ArrayPayload
            | Format::PackedSwitchPayload
            | Format::SparseSwitchPayload => RegisterLayout::None,

            Format::Format11n => RegisterLayout::Fixed(NIBBLE),
            Format::Format11x
            | Format::Format21c
            | Format::Format21ih
            | Format::Format21lh
            | Format::Format21s
            | Format::Format21t
            | Format::Format31c
            | Format::Format31i
            | Format::Format31t
            | Format::Format51l => RegisterLayout::Fixed(BYTE),

            Format::Format12x
            | Format::Format22c
            | Format::Format22cs
            | Format::Format22s
            | Format::Format22t => RegisterLayout::Fixed(NIBBLE2),
            Format::Format22b => RegisterLayout::Fixed(BYTE2),
            Format::Format22x => RegisterLayout::Fixed(BYTE_WORD),
            Format::Format32x => RegisterLayout::Fixed(WORD2),
            Format::Format23x => RegisterLayout::Fixed(BYTE3),

            Format::Format35c | Format::Format35mi | Format::Format35ms | Format::Format45cc => {
                RegisterLayout::Variadic
            }
            Format::Format3rc | Format::Format3rmi | Format::Format3rms | Format::Format4rcc => {
                RegisterLayout::Range
            }
        }
    }

    /// The operand shape a decoder must pair with instructions of this format.
    pub const fn operand_shape(self) -> OperandShape {
        match self {
            Format::Format10x => OperandShape::Nullary,
            Format::Format10t | Format::Format20t | Format::Format30t => OperandShape::Branch,
            Format::Format20bc => OperandShape::VerificationError,
            Format::Format11x => OperandShape::One,
            Format::Format11n
            | Format::Format21ih
            | Format::Format21lh
            | Format::Format21s
            | Format::Format31i
            | Format::Format51l => OperandShape::OneLiteral,
            Format::Format21c | Format::Format31c => OperandShape::OneReference,
            Format::Format21t | Format::Format31t => OperandShape::OneBranch,
            Format::Format12x | Format::Format22x | Format::Format32x => OperandShape::Two,
            Format::Format22b | Format::Format22s => OperandShape::TwoLiteral,
            Format::Format22c => OperandShape::TwoReference,
            Format::Format22cs => OperandShape::TwoIndexed,
            Format::Format22t => OperandShape::TwoBranch,
            Format::Format23x => OperandShape::Three,
            Format::Format35c => OperandShape::Invoke,
            Format::Format35mi | Format::Format35ms => OperandShape::InvokeIndexed,
            Format::Format45cc => OperandShape::InvokePolymorphic,
            Format::Format3rc => OperandShape::Range,
            Format::Format3rmi | Format::Format3rms => OperandShape::RangeIndexed,
            Format::Format4rcc => OperandShape::RangePolymorphic,
            Format::ArrayPayload => OperandShape::ArrayData,
            Format::PackedSwitchPayload => OperandShape::PackedSwitch,
            Format::SparseSwitchPayload => OperandShape::SparseSwitch,
        }
    }

    /// Operand groups carried by this format.
    pub const fn capabilities(self) -> Capabilities {
        self.operand_shape().capabilities()
    }

    /// Short Dalvik name (`"22c"`, `"packed-switch-payload"`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Format::Format10t => "10t",
            Format::Format10x => "10x",
            Format::Format11n => "11n",
            Format::Format11x => "11x",
            Format::Format12x => "12x",
            Format::Format20bc => "20bc",
            Format::Format20t => "20t",
            Format::Format21c => "21c",
            Format::Format21ih => "21ih",
            Format::Format21lh => "21lh",
            Format::Format21s => "21s",
            Format::Format21t => "21t",
            Format::Format22b => "22b",
            Format::Format22c => "22c",
            Format::Format22cs => "22cs",
            Format::Format22s => "22s",
            Format::Format22t => "22t",
            Format::Format22x => "22x",
            Format::Format23x => "23x",
            Format::Format30t => "30t",
            Format::Format31c => "31c",
            Format::Format31i => "31i",
            Format::Format31t => "31t",
            Format::Format32x => "32x",
            Format::Format35c => "35c",
            Format::Format35mi => "35mi",
            Format::Format35ms => "35ms",
            Format::Format3rc => "3rc",
            Format::Format3rmi => "3rmi",
            Format::Format3rms => "3rms",
            Format::Format45cc => "45cc",
            Format::Format4rcc => "4rcc",
            Format::Format51l => "51l",
            Format::ArrayPayload => "array-payload",
            Format::PackedSwitchPayload => "packed-switch-payload",
            Format::SparseSwitchPayload => "sparse-switch-payload",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
