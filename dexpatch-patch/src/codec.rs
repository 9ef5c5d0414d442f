//! Seams to the external container codec.

use std::fmt;

use dexpatch_ir::Program;

/// Decodes a binary container into a [`Program`], filling each method
/// body's parameter register count.
pub trait ProgramDecoder {
    type Error: fmt::Display;

    fn decode(&self, bytes: &[u8]) -> Result<Program, Self::Error>;
}

/// Serializes a [`Program`] back into a container, recomputing structural
/// bookkeeping (outgoing argument sizes, absolute offsets, constant pools).
pub trait ProgramEncoder {
    type Error: fmt::Display;

    fn encode(&self, program: &Program) -> Result<Vec<u8>, Self::Error>;
}
