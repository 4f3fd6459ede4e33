//! OAM DMA as seen by the CPU: a run of stolen cycles.
//!
//! A write to $4014 asks for the CPU to be halted. RDY only takes effect on
//! a read, so the halt starts at the first read cycle after the request.
//! From there the unit holds RDY for 513 cycles, or 514 if the halt began
//! on an odd CPU cycle (one extra cycle to align reads with even cycles).
//! The byte copying itself belongs to the PPU side and is not modelled.

use log::debug;

/// Cycles held when the halt starts on an even CPU cycle.
const STOLEN_CYCLES: u16 = 513;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DmaState {
    #[default]
    Idle,
    /// RDY is asserted; waiting for the core to reach a read cycle.
    Requested,
    /// The core is halted. Counts the cycles still to steal.
    Halting { remaining: u16 },
}

/// Cycle-steal unit.
#[derive(Debug, Default, Clone)]
pub struct CycleSteal {
    state: DmaState,
    /// Source page written to $4014.
    page: u8,
    /// Cycles stolen by the transfer in progress, or the last one.
    stolen: u16,
}

impl CycleSteal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transfer from `page`. A request while one is running is
    /// ignored.
    pub fn request(&mut self, page: u8) {
        if self.state != DmaState::Idle {
            return;
        }
        debug!("OAM DMA requested from ${:02X}00", page);
        self.page = page;
        self.stolen = 0;
        self.state = DmaState::Requested;
    }

    /// Called once per CPU cycle, after the falling edge.
    ///
    /// `stalled` is whether the core sat this cycle out; `odd` is the parity
    /// of the CPU cycle.
    pub fn observe(&mut self, stalled: bool, odd: bool) {
        match self.state {
            DmaState::Idle => {}
            DmaState::Requested => {
                if stalled {
                    let total = if odd { STOLEN_CYCLES + 1 } else { STOLEN_CYCLES };
                    self.stolen = 1;
                    self.state = DmaState::Halting {
                        remaining: total - 1,
                    };
                }
            }
            DmaState::Halting { remaining } => {
                let remaining = if stalled {
                    self.stolen += 1;
                    remaining - 1
                } else {
                    remaining
                };
                self.state = if remaining == 0 {
                    debug!("OAM DMA released after {} cycles", self.stolen);
                    DmaState::Idle
                } else {
                    DmaState::Halting { remaining }
                };
            }
        }
    }

    /// True while RDY should be held.
    #[must_use]
    pub fn is_halting(&self) -> bool {
        self.state != DmaState::Idle
    }

    #[must_use]
    pub fn state(&self) -> DmaState {
        self.state
    }

    #[must_use]
    pub fn page(&self) -> u8 {
        self.page
    }

    /// Cycles stolen so far by the current transfer, or by the last one.
    #[must_use]
    pub fn stolen(&self) -> u16 {
        self.stolen
    }
}
