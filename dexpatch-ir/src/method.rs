//! Method implementations.

use dexpatch_isa::{Instruction, Reg, code_units_of};
use serde::{Deserialize, Serialize};

/// A method's code: its register window and instruction stream.
///
/// Parameter registers occupy the topmost `parameter_registers` slots of
/// `[0, registers)`; locals sit below them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBody {
    /// Total register count (`registers_size`).
    pub registers: u16,
    /// Registers holding incoming arguments (`ins_size`).
    pub parameter_registers: u16,
    pub instructions: Vec<Instruction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tries: Vec<TryBlock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub debug_items: Vec<DebugItem>,
}

impl MethodBody {
    pub fn new(registers: u16, parameter_registers: u16, instructions: Vec<Instruction>) -> Self {
        Self {
            registers,
            parameter_registers,
            instructions,
            tries: Vec::new(),
            debug_items: Vec::new(),
        }
    }

    /// Number of registers below the parameter window. Saturates at zero for
    /// an inconsistent body that claims more parameters than registers.
    #[inline]
    pub fn local_registers(&self) -> u16 {
        self.registers.saturating_sub(self.parameter_registers)
    }

    /// First parameter register (`p0`), if the method takes any.
    pub fn first_parameter(&self) -> Option<Reg> {
        (self.parameter_registers > 0 && self.parameter_registers <= self.registers)
            .then(|| Reg(self.registers - self.parameter_registers))
    }

    /// Length of the instruction stream in code units.
    pub fn code_units(&self) -> usize {
        code_units_of(&self.instructions)
    }
}

/// A try region, addressed in code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryBlock {
    pub start_address: u32,
    pub code_units: u32,
    pub handlers: Vec<ExceptionHandler>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionHandler {
    /// Caught type descriptor; `None` for a catch-all.
    pub exception_type: Option<String>,
    pub handler_address: u32,
}

/// A debug-info event at a code address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugItem {
    pub address: u32,
    pub kind: DebugKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DebugKind {
    LineNumber {
        line: u32,
    },
    StartLocal {
        register: Reg,
        name: Option<String>,
        #[serde(rename = "type")]
        local_type: Option<String>,
        signature: Option<String>,
    },
    EndLocal {
        register: Reg,
    },
    RestartLocal {
        register: Reg,
    },
    PrologueEnd,
    EpilogueBegin,
    SetSourceFile {
        name: Option<String>,
    },
}
