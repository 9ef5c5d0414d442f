//! Whole-method register renumbering.

use std::num::NonZeroUsize;
use std::thread;

use dexpatch_ir::MethodBody;

use crate::budget::needs_extra_register;
use crate::error::{Error, Result, ShiftError};
use crate::shift::shift_instruction;

/// Shift every register operand of every instruction by one and grow the
/// register window by one, unconditionally.
///
/// Parameters stay in the topmost slots, so each operand still names the
/// same parameter or local, and `v0` becomes a fresh local. Not idempotent:
/// a second pass shifts already shifted operands again.
pub fn renumber(body: &MethodBody) -> Result<MethodBody> {
    let registers = body
        .registers
        .checked_add(1)
        .ok_or(Error::RegisterWindowFull {
            registers: body.registers,
        })?;

    let instructions = body
        .instructions
        .iter()
        .enumerate()
        .map(|(index, insn)| shift_instruction(insn).map_err(|e| Error::from_shift(index, e)))
        .collect::<Result<Vec<_>>>()?;

    Ok(MethodBody {
        registers,
        parameter_registers: body.parameter_registers,
        instructions,
        tries: body.tries.clone(),
        debug_items: body.debug_items.clone(),
    })
}

/// Make room for one local register if the method has none.
///
/// When every register is a parameter the body is [`renumber`]ed; otherwise
/// it is returned as is and `v0` is already a local.
pub fn transform(body: &MethodBody) -> Result<MethodBody> {
    if needs_extra_register(body.registers, body.parameter_registers) {
        renumber(body)
    } else {
        Ok(body.clone())
    }
}

/// [`transform`] independent method bodies on scoped worker threads.
/// Results are returned in input order.
pub fn transform_all(bodies: &[MethodBody]) -> Vec<Result<MethodBody>> {
    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    if bodies.len() < 2 || workers < 2 {
        return bodies.iter().map(transform).collect();
    }

    let chunk = bodies.len().div_ceil(workers);
    thread::scope(|scope| {
        let handles: Vec<_> = bodies
            .chunks(chunk)
            .map(|part| scope.spawn(move || part.iter().map(transform).collect::<Vec<_>>()))
            .collect();
        handles
            .into_iter()
            .flat_map(|h| match h.join() {
                Ok(results) => results,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    })
}

/// Run the shift over a body without building output, collecting every
/// instruction that cannot be renumbered.
pub fn diagnose(body: &MethodBody) -> Vec<(usize, ShiftError)> {
    body.instructions
        .iter()
        .enumerate()
        .filter_map(|(index, insn)| shift_instruction(insn).err().map(|e| (index, e)))
        .collect()
}
