//! 6502 processor status register (P).
//!
//! Only six bits are real flip-flops. Bits 4 and 5 exist only in the byte
//! that is pushed to the stack: bit 5 always reads 1 and bit 4 tells a
//! software BRK (or PHP) apart from a hardware interrupt.

/// Carry flag - set if operation resulted in carry/borrow.
pub const C: u8 = 0x01;

/// Zero flag - set if result is zero.
pub const Z: u8 = 0x02;

/// Interrupt disable - when set, IRQ interrupts are ignored.
pub const I: u8 = 0x04;

/// Decimal mode - enables BCD arithmetic for ADC/SBC.
pub const D: u8 = 0x08;

/// Break bit - only present in a pushed status byte.
pub const B: u8 = 0x10;

/// Unused bit - always 1 in a pushed status byte.
pub const U: u8 = 0x20;

/// Overflow flag - set if signed arithmetic overflowed.
pub const V: u8 = 0x40;

/// Negative flag - set if result has bit 7 set.
pub const N: u8 = 0x80;

const STORED: u8 = C | Z | I | D | V | N;

/// Processor status register.
///
/// Holds the six stored flags. B and U are synthesised by [`Status::to_byte`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    /// All flags clear.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Unpack a byte pulled from the stack. Bits 4 and 5 are ignored.
    #[must_use]
    pub const fn from_byte(value: u8) -> Self {
        Self(value & STORED)
    }

    /// Pack for pushing. Bit 5 is always set; bit 4 is set when `brk` is true
    /// (BRK, PHP) and clear for IRQ/NMI.
    #[must_use]
    pub const fn to_byte(self, brk: bool) -> u8 {
        if brk { self.0 | U | B } else { self.0 | U }
    }

    /// Check if a flag is set.
    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Set a flag.
    pub fn set(&mut self, flag: u8) {
        self.0 |= flag & STORED;
    }

    /// Clear a flag.
    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Set or clear a flag based on condition.
    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Update N and Z flags based on a value.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }
}
