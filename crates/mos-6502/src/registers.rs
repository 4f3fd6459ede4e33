//! 6502 CPU registers.

use crate::Status;

/// 6502 CPU register set.
///
/// The 6502 has minimal registers:
/// - A: 8-bit accumulator
/// - X, Y: 8-bit index registers
/// - S: 8-bit stack pointer (stack is at $0100-$01FF)
/// - PC: 16-bit program counter
/// - P: processor status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Accumulator.
    pub a: u8,
    /// X index register.
    pub x: u8,
    /// Y index register.
    pub y: u8,
    /// Stack pointer (points to next free location, stack at $0100-$01FF).
    pub s: u8,
    /// Program counter.
    pub pc: u16,
    /// Processor status flags.
    pub p: Status,
}

impl Default for Registers {
    fn default() -> Self {
        Self::power_on()
    }
}

impl Registers {
    /// Register contents the chip powers up with.
    ///
    /// These are the values a real NMOS part shows at power-on before the
    /// reset sequence runs: PC=$00FF, X=$C0, S=$C0, everything else clear.
    /// The reset sequence then takes S down by three to $BD.
    #[must_use]
    pub const fn power_on() -> Self {
        Self {
            a: 0,
            x: 0xC0,
            y: 0,
            s: 0xC0,
            pc: 0x00FF,
            p: Status::new(),
        }
    }

    /// Address of the stack slot S currently points at.
    #[must_use]
    pub const fn stack_addr(&self) -> u16 {
        0x0100 | (self.s as u16)
    }
}
