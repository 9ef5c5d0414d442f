//! Register budget analysis.

/// Whether a method needs an extra register for the preamble: true when
/// every register of the window is a parameter register.
#[inline]
pub const fn needs_extra_register(total_registers: u16, parameter_registers: u16) -> bool {
    total_registers == parameter_registers
}
