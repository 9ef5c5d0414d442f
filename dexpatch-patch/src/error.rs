use dexpatch_isa::{Format, OperandShape, Opcode};
use thiserror::Error;

/// Why a single instruction could not be renumbered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShiftError {
    /// The operands carried do not have the shape the opcode's format requires.
    #[error("{opcode} (format {format}) expects {expected} operands, found {found}")]
    ShapeMismatch {
        opcode: Opcode,
        format: Format,
        expected: OperandShape,
        found: OperandShape,
    },

    /// A variadic argument list declares more than five active registers.
    #[error("{opcode} declares {count} argument registers, at most 5 are encodable")]
    ArgCount { opcode: Opcode, count: u8 },

    /// The shifted register no longer fits its encoding field.
    #[error("{opcode}: register v{register} does not fit a {width}-bit register field")]
    RegisterOverflow {
        opcode: Opcode,
        register: u32,
        width: u8,
    },
}

impl ShiftError {
    /// Decoder contract violations, as opposed to a well-formed instruction
    /// that simply has no room to grow.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, ShiftError::RegisterOverflow { .. })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed instruction #{index}: {source}")]
    MalformedInstruction {
        index: usize,
        #[source]
        source: ShiftError,
    },

    #[error("Register overflow at instruction #{index}: {source}")]
    RegisterOverflow {
        index: usize,
        #[source]
        source: ShiftError,
    },

    #[error("Register window of {registers} registers cannot grow")]
    RegisterWindowFull { registers: u16 },

    #[error("Method {class}->{method} not found")]
    MethodNotFound { class: String, method: String },

    #[error(
        "Inconsistent register counts in {class}->{method}: {parameters} parameter registers but only {registers} registers"
    )]
    InconsistentRegisters {
        class: String,
        method: String,
        registers: u16,
        parameters: u16,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Attach the instruction index to a shift failure, classifying it.
    pub fn from_shift(index: usize, source: ShiftError) -> Self {
        if source.is_malformed() {
            Error::MalformedInstruction { index, source }
        } else {
            Error::RegisterOverflow { index, source }
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
