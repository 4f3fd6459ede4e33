//! External pins of the 6502 package.

use std::fmt;

/// Electrical state of the chip's pins.
///
/// `res`, `irq` and `nmi` are active-low inputs: `false` means the line is
/// pulled low. `rdy` is modelled as a halt request, so `true` pauses the core
/// on read cycles. `phi2` mirrors the Ø0 input the chip is currently clocked
/// with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pins {
    /// A0-A15.
    pub address: u16,
    /// D0-D7.
    pub data: u8,
    /// R/W: high while the chip reads.
    pub rw: bool,
    /// High during the cycle that fetches an opcode.
    pub sync: bool,
    pub res: bool,
    pub irq: bool,
    pub nmi: bool,
    pub rdy: bool,
    pub phi2: bool,
}

impl Pins {
    /// Pin levels at power-on.
    #[must_use]
    pub const fn power_on() -> Self {
        Self {
            address: 0x00FF,
            data: 0,
            rw: true,
            sync: false,
            res: true,
            irq: true,
            nmi: true,
            rdy: false,
            phi2: true,
        }
    }

    /// True while the chip is driving the data bus.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        !self.rw
    }
}

impl Default for Pins {
    fn default() -> Self {
        Self::power_on()
    }
}

impl fmt::Display for Pins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ø2 {}   AB {:04X}   DB {:02X}   RW {}   SYNC {}   RES {}",
            u8::from(self.phi2),
            self.address,
            self.data,
            u8::from(self.rw),
            u8::from(self.sync),
            u8::from(self.res),
        )
    }
}
