//! Smali-style rendering of instructions.

use std::fmt;

use crate::instruction::Instruction;
use crate::operands::{ArgList, Operands, RegRange};

struct Args<'a>(&'a ArgList);

impl fmt::Display for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, reg) in self.0.active().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{reg}")?;
        }
        f.write_str("}")
    }
}

struct Range<'a>(&'a RegRange);

impl fmt::Display for Range<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.last() {
            Some(last) => write!(f, "{{{} .. v{last}}}", self.0.start),
            None => f.write_str("{}"),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode;
        match &self.operands {
            Operands::Nullary => write!(f, "{op}"),
            Operands::Branch { offset } => write!(f, "{op} {offset:+}"),
            Operands::VerificationError { kind, reference } => {
                write!(f, "{op} {kind}, {reference}")
            }
            Operands::One { a } => write!(f, "{op} {a}"),
            Operands::OneLiteral { a, literal } => write!(f, "{op} {a}, {literal}"),
            Operands::OneReference { a, reference } => write!(f, "{op} {a}, {reference}"),
            Operands::OneBranch { a, offset } => write!(f, "{op} {a}, {offset:+}"),
            Operands::Two { a, b } => write!(f, "{op} {a}, {b}"),
            Operands::TwoLiteral { a, b, literal } => write!(f, "{op} {a}, {b}, {literal}"),
            Operands::TwoReference { a, b, reference } => {
                write!(f, "{op} {a}, {b}, {reference}")
            }
            Operands::TwoIndexed { a, b, index } => write!(f, "{op} {a}, {b}, {index}"),
            Operands::TwoBranch { a, b, offset } => write!(f, "{op} {a}, {b}, {offset:+}"),
            Operands::Three { a, b, c } => write!(f, "{op} {a}, {b}, {c}"),
            Operands::Invoke { args, reference } => {
                write!(f, "{op} {}, {reference}", Args(args))
            }
            Operands::InvokeIndexed { args, index } => write!(f, "{op} {}, {index}", Args(args)),
            Operands::InvokePolymorphic {
                args,
                method,
                proto,
            } => write!(f, "{op} {}, {method}, {proto}", Args(args)),
            Operands::Range { range, reference } => {
                write!(f, "{op} {}, {reference}", Range(range))
            }
            Operands::RangeIndexed { range, index } => {
                write!(f, "{op} {}, {index}", Range(range))
            }
            Operands::RangePolymorphic {
                range,
                method,
                proto,
            } => write!(f, "{op} {}, {method}, {proto}", Range(range)),
            Operands::ArrayData {
                element_width,
                elements,
            } => {
                write!(f, "{op} {element_width} {{")?;
                for (i, e) in elements.iter().enumerate() {
                    let sep = if i > 0 { ", " } else { "" };
                    write!(f, "{sep}{e:#x}")?;
                }
                f.write_str("}")
            }
            Operands::PackedSwitch { first_key, targets } => {
                write!(f, "{op} {first_key:#x} {{")?;
                for (i, t) in targets.iter().enumerate() {
                    let sep = if i > 0 { ", " } else { "" };
                    write!(f, "{sep}{t:+}")?;
                }
                f.write_str("}")
            }
            Operands::SparseSwitch { cases } => {
                write!(f, "{op} {{")?;
                for (i, c) in cases.iter().enumerate() {
                    let sep = if i > 0 { ", " } else { "" };
                    write!(f, "{sep}{:#x} -> {:+}", c.key, c.target)?;
                }
                f.write_str("}")
            }
        }
    }
}
