//! Output side of the processor. Rendering lives behind [`OutputPort`]; the
//! processor only reports what happened.

use log::{debug, info, trace};

use crate::memory::{Byte, Word};
use crate::processor::error::RuntimeError;
use crate::processor::flags::Flags;
use crate::processor::registers::RegisterFile;
use crate::processor::InstructionRegister;

/// Interrupt that renders AX on the LED bar
pub const INT_LEDS: Byte = 0;
/// Interrupt that emits AX as a character
pub const INT_CHAR: Byte = 1;

/// Read-only view of the processor after a step
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub registers: &'a RegisterFile,
    pub flags: &'a Flags,
    pub memory: &'a [Byte],
    pub pc: Word,
    pub ir: InstructionRegister,
}

/// Receives notifications from the processor
pub trait OutputPort {
    /// Called after every executed step
    fn on_state_changed(&mut self, state: &Snapshot<'_>);

    /// Called for the defined interrupts [`INT_LEDS`] and [`INT_CHAR`]
    fn on_interrupt(&mut self, number: Byte, ax: Byte);

    /// Called for every runtime error, fatal or not
    fn on_error(&mut self, _error: &RuntimeError) {}
}

/// Ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPort;

impl OutputPort for NullPort {
    fn on_state_changed(&mut self, _state: &Snapshot<'_>) {}

    fn on_interrupt(&mut self, _number: Byte, _ax: Byte) {}
}

/// The LED bar: bit 7 first
pub fn led_pattern(value: Byte) -> String {
    (0..8)
        .rev()
        .map(|bit| if value & (1 << bit) != 0 { '●' } else { '○' })
        .collect()
}

/// Reports everything through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPort;

impl OutputPort for LogPort {
    fn on_state_changed(&mut self, state: &Snapshot<'_>) {
        trace!(
            "PC: {:02x} IR: {:02x}{:02x}\n{}\n{}",
            state.pc,
            state.ir.opcode,
            state.ir.mode,
            state.registers,
            state.flags
        );
    }

    fn on_interrupt(&mut self, number: Byte, ax: Byte) {
        match number {
            INT_LEDS => info!("LEDs: {} (AX = {:02x})", led_pattern(ax), ax),
            INT_CHAR => info!("Char: {:?}", char::from(ax)),
            _ => debug!("Ignoring interrupt {}", number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leds_are_msb_first() {
        assert_eq!(led_pattern(0x00), "○○○○○○○○");
        assert_eq!(led_pattern(0x81), "●○○○○○○●");
        assert_eq!(led_pattern(0x0F), "○○○○●●●●");
    }
}
