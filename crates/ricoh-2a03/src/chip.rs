//! The 2A03 package: a 6502 core clocked from the NES master clock.
//!
//! The master clock is divided by 12. Every 12th edge of CLK toggles the
//! core's Ø0, so one CPU cycle spans 24 edges. M2, the clock the cartridge
//! sees, rises 3 edges before the core goes high and falls together with it.

use emu_core::{Bus, Cpu, Observable, Tickable, Value};
use log::debug;
use mos_6502::{Mos6502, Options, Pins, Registers, Status, flags};

use crate::dma::CycleSteal;

/// CLK edges per half CPU cycle.
pub const EDGES_PER_PHASE: u8 = 12;

/// Edge within a phase at which M2 rises, if it is not already high.
pub const M2_RISE_EDGE: u8 = 9;

/// Writing a page number here starts OAM DMA.
pub const OAM_DMA: u16 = 0x4014;

/// Ricoh 2A03 CPU.
#[derive(Debug, Clone)]
pub struct Ricoh2A03 {
    core: Mos6502,
    dma: CycleSteal,
    clk: bool,
    /// CLK edges since Ø0 last toggled.
    edges: u8,
    phi0: bool,
    m2: bool,
    /// Falling edges of Ø0 seen.
    cpu_cycles: u64,
}

impl Default for Ricoh2A03 {
    fn default() -> Self {
        Self::new()
    }
}

impl Ricoh2A03 {
    /// Create a 2A03 in its power-on state.
    ///
    /// The core has decimal mode disabled and powers on with X and S clear
    /// and Z set, unlike a discrete 6502. The divider and the core's Ø2 both
    /// start low, so Ø2 first rises on edge 12.
    #[must_use]
    pub fn new() -> Self {
        let mut p = Status::new();
        p.set(flags::Z);
        let regs = Registers {
            x: 0,
            s: 0,
            p,
            ..Registers::power_on()
        };

        Self {
            core: Mos6502::with_registers(Options::nes(), regs).with_phase_low(),
            dma: CycleSteal::new(),
            clk: false,
            edges: 0,
            phi0: false,
            m2: false,
            cpu_cycles: 0,
        }
    }

    /// Drive the master clock input. Nothing happens unless the level
    /// changes.
    pub fn set_clk(&mut self, level: bool) {
        if self.clk == level {
            return;
        }
        self.clk = level;
        self.edges += 1;

        if self.edges == M2_RISE_EDGE && !self.m2 {
            self.m2 = true;
        } else if self.edges == EDGES_PER_PHASE {
            self.edges = 0;
            self.phi0 = !self.phi0;
            self.core.set_phase(self.phi0);
            if self.phi0 {
                self.phase_high();
            } else {
                self.phase_low();
            }
        }
    }

    fn phase_high(&mut self) {
        let pins = self.core.pins();
        if pins.is_write() && pins.address == OAM_DMA && pins.res {
            let page = pins.data;
            self.dma.request(page);
            self.core.set_rdy(true);
        }
    }

    fn phase_low(&mut self) {
        self.m2 = false;
        self.cpu_cycles += 1;

        let odd = self.cpu_cycles % 2 == 1;
        let was_halting = self.dma.is_halting();
        self.dma.observe(self.core.is_stalled(), odd);
        if was_halting && !self.dma.is_halting() {
            debug!("core resumes at cycle {}", self.cpu_cycles);
        }
        self.core.set_rdy(self.dma.is_halting());
    }

    /// Complete the bus transaction the pins describe.
    pub fn service<B: Bus>(&mut self, bus: &mut B) {
        self.core.service(bus);
    }

    // === Pins ===

    #[must_use]
    pub const fn pins(&self) -> &Pins {
        self.core.pins()
    }

    #[must_use]
    pub const fn clk(&self) -> bool {
        self.clk
    }

    /// M2 output.
    #[must_use]
    pub const fn m2(&self) -> bool {
        self.m2
    }

    /// Level of the core's Ø2.
    #[must_use]
    pub const fn phase(&self) -> bool {
        self.pins().phi2
    }

    /// Drive RES. `false` holds the chip in reset.
    pub fn set_reset(&mut self, level: bool) {
        self.core.set_reset(level);
    }

    /// Drive IRQ. `false` requests an interrupt.
    pub fn set_irq(&mut self, level: bool) {
        self.core.set_irq(level);
    }

    /// Drive NMI. A high-to-low transition requests an interrupt.
    pub fn set_nmi(&mut self, level: bool) {
        self.core.set_nmi(level);
    }

    // === Inspection ===

    #[must_use]
    pub const fn core(&self) -> &Mos6502 {
        &self.core
    }

    #[must_use]
    pub const fn dma(&self) -> &CycleSteal {
        &self.dma
    }

    /// CPU cycles since power-on.
    #[must_use]
    pub const fn cpu_cycles(&self) -> u64 {
        self.cpu_cycles
    }
}

impl Tickable for Ricoh2A03 {
    /// One edge of the master clock.
    fn tick(&mut self) {
        self.set_clk(!self.clk);
    }
}

impl Cpu for Ricoh2A03 {
    type Registers = Registers;

    fn pc(&self) -> u16 {
        self.core.pc()
    }

    fn registers(&self) -> Registers {
        self.core.registers()
    }

    fn is_halted(&self) -> bool {
        self.core.is_halted()
    }
}

impl Observable for Ricoh2A03 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "clk" => Some(self.clk.into()),
            "m2" => Some(self.m2.into()),
            "phase" => Some(self.phase().into()),
            "dma.active" => Some(self.dma.is_halting().into()),
            "dma.stolen" => Some(self.dma.stolen().into()),
            "cpu_cycles" => Some(Value::U64(self.cpu_cycles)),
            _ => self.core.query(path),
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "clk", "m2", "phase", "dma.active", "dma.stolen", "cpu_cycles", "pc", "a", "x", "y",
            "s", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.v", "flags.n", "ir",
            "step", "sync", "rw", "address", "data", "cycle", "jammed", "irq_latch", "nmi_latch",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_on_state() {
        let chip = Ricoh2A03::new();
        let regs = chip.registers();
        assert_eq!(regs.x, 0);
        assert_eq!(regs.s, 0);
        assert!(regs.p.is_set(flags::Z));
        assert!(!chip.core().options().decimal_enabled);
        assert!(!chip.m2());
        assert!(!chip.phase());
    }

    #[test]
    fn core_phase_toggles_every_twelve_edges() {
        let mut chip = Ricoh2A03::new();
        chip.tick_n(11);
        assert!(!chip.phase());
        chip.tick();
        assert!(chip.phase());
        chip.tick_n(11);
        assert!(chip.phase());
        chip.tick();
        assert!(!chip.phase());
        assert_eq!(chip.cpu_cycles(), 1);
    }

    #[test]
    fn set_clk_to_same_level_is_a_no_op() {
        let mut chip = Ricoh2A03::new();
        for _ in 0..30 {
            chip.set_clk(true);
        }
        assert_eq!(chip.query("phase"), Some(Value::Bool(false)));
        assert!(chip.clk());
    }

    #[test]
    fn observable_paths_resolve() {
        let chip = Ricoh2A03::new();
        for path in chip.query_paths() {
            assert!(chip.query(path).is_some(), "{path}");
        }
        assert_eq!(chip.query("dma.active"), Some(Value::Bool(false)));
    }
}
