//! The pin-level 6502 engine.
//!
//! The chip is clocked by writing the Ø0 input through [`Mos6502::set_phase`].
//! Work happens on edges:
//!
//! - Falling edge (Ø0 high to low): latched register writes land, interrupts
//!   are sampled, and one microcode step runs. The step reads whatever the
//!   bus left on the data pins and sets up the next address and direction.
//! - Rising edge (Ø0 low to high): if the step asked to write, the value is
//!   put on the data pins.
//!
//! Between edges the owner services the bus: on a read it copies memory into
//! the data pins, on a write it stores the data pins into memory.

use emu_core::{Bus, Cpu, Observable, Value};
use log::debug;

use crate::config::{CompatibilityMode, Options};
use crate::flags::{C, D, I, N, V, Z};
use crate::interrupts::{Hijack, IRQ_RECOGNISED, InterruptLatch, NMI_RECOGNISED};
use crate::{Pins, Registers, Status};

/// Register writes computed by one step and committed on the next low phase.
#[derive(Debug, Default, Clone, Copy)]
struct Pending {
    a: Option<u8>,
    x: Option<u8>,
    y: Option<u8>,
    s: Option<u8>,
}

/// The MOS 6502 CPU.
///
/// Every call to [`set_phase`](Self::set_phase) that changes the level is one
/// half-cycle. [`tick`](Self::tick) is the usual full cycle: low, then high.
///
/// Registers are read through [`Cpu::registers`] and the accessors below.
/// Only the clock changes them:
///
/// ```compile_fail
/// let mut cpu = mos_6502::Mos6502::default();
/// cpu.regs.a = 0x42;
/// ```
#[derive(Debug, Clone)]
pub struct Mos6502 {
    /// CPU registers. Writes to A, X, Y and S by the microcode go through the
    /// pending slots first.
    pub(crate) regs: Registers,

    pub(crate) pins: Pins,

    /// Instruction register.
    pub(crate) ir: u8,

    /// Microcode step within the current instruction.
    pub(crate) step: u8,

    /// Internal address/operand latch.
    pub(crate) ad: u16,

    /// Working copy of S used by stack sequences.
    pub(crate) sp: u8,

    /// Forced BRK pending or running.
    pub(crate) hijack: Hijack,

    /// Half-cycles counted since reset was released.
    reset_step: u8,

    /// Value to drive on the next rising edge.
    data_out: Option<u8>,

    /// Data pins as they were before a write drove them.
    data_restore: Option<u8>,

    pending: Pending,

    pub(crate) irq_latch: InterruptLatch,
    pub(crate) nmi_latch: InterruptLatch,
    nmi_prev: bool,

    pub(crate) jammed: bool,
    stalled: bool,

    options: Options,

    /// Falling edges seen while out of reset.
    total_cycles: u64,
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Mos6502 {
    /// Create a chip in its power-on state.
    ///
    /// A reset sequence is already pending, so clocking the chip runs the
    /// reset vector fetch whether or not RES is ever pulled low.
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self::with_registers(options, Registers::power_on())
    }

    /// Create a chip with specific register contents, reset still pending.
    #[must_use]
    pub fn with_registers(options: Options, regs: Registers) -> Self {
        let mut pins = Pins::power_on();
        pins.address = regs.pc;
        Self {
            regs,
            pins,
            ir: 0,
            step: 0,
            ad: 0,
            sp: regs.s,
            hijack: Hijack::Reset,
            reset_step: 0,
            data_out: None,
            data_restore: None,
            pending: Pending::default(),
            irq_latch: InterruptLatch::default(),
            nmi_latch: InterruptLatch::default(),
            nmi_prev: true,
            jammed: false,
            stalled: false,
            options,
            total_cycles: 0,
        }
    }

    /// Create a chip that is in the middle of fetching the opcode at
    /// `regs.pc`: Ø2 and SYNC are up and the address pins hold the PC.
    ///
    /// Service the bus once to put the opcode on the data pins, then clock.
    #[must_use]
    pub fn at_opcode_fetch(options: Options, regs: Registers) -> Self {
        let mut cpu = Self::with_registers(options, regs);
        cpu.hijack = Hijack::None;
        cpu.reset_step = u8::MAX;
        cpu.pins.sync = true;
        cpu.pins.address = regs.pc;
        cpu.pins.phi2 = true;
        cpu
    }

    /// Start with Ø0 low, for owners whose clock generator comes up low.
    ///
    /// The first rising edge then does nothing and the first step runs on
    /// the falling edge after it.
    #[must_use]
    pub fn with_phase_low(mut self) -> Self {
        self.pins.phi2 = false;
        self
    }

    // === Clock ===

    /// Drive the Ø0 input. Nothing happens unless the level changes.
    pub fn set_phase(&mut self, high: bool) {
        if self.pins.phi2 == high {
            return;
        }
        self.pins.phi2 = high;

        // RES held low stops the clock from doing anything.
        if !self.pins.res {
            return;
        }

        if high {
            self.phase_high();
        } else {
            self.phase_low();
        }
    }

    /// One full cycle: Ø0 low, then high. Service the bus afterwards.
    pub fn tick(&mut self) {
        self.set_phase(false);
        self.set_phase(true);
    }

    /// Complete the bus transaction the pins describe.
    pub fn service<B: Bus>(&mut self, bus: &mut B) {
        if self.pins.rw {
            self.pins.data = bus.read(self.pins.address);
        } else {
            bus.write(self.pins.address, self.pins.data);
        }
    }

    fn phase_high(&mut self) {
        if let Some(value) = self.data_out.take() {
            self.data_restore = Some(self.pins.data);
            self.pins.data = value;
        }
    }

    fn phase_low(&mut self) {
        self.total_cycles += 1;
        self.commit_pending();
        self.sample_interrupts();

        // RDY only halts read cycles; writes always complete.
        if self.pins.rdy && self.pins.rw {
            self.stalled = true;
            self.irq_latch.shift();
            self.nmi_prev = self.pins.nmi;
            return;
        }
        self.stalled = false;

        if self.pins.sync {
            self.begin_instruction();
        }

        if self.hijack == Hijack::Reset && !self.advance_reset() {
            self.end_cycle();
            return;
        }

        if let Some(value) = self.data_restore.take() {
            self.pins.data = value;
        }
        self.pins.rw = true;

        self.execute();

        if self.options.compatibility == CompatibilityMode::NesTest {
            self.commit_pending();
        }
        self.step = self.step.wrapping_add(1);
        self.end_cycle();
    }

    fn sample_interrupts(&mut self) {
        if self.nmi_prev && !self.pins.nmi {
            self.nmi_latch.sample();
        }
        if !self.pins.irq && !self.regs.p.is_set(I) {
            self.irq_latch.sample();
        }
    }

    fn end_cycle(&mut self) {
        self.irq_latch.shift();
        self.nmi_latch.shift();
        self.nmi_prev = self.pins.nmi;
    }

    /// The opcode fetched last cycle is on the data pins. Latch it, or
    /// replace it with BRK if an interrupt is due.
    fn begin_instruction(&mut self) {
        self.pins.sync = false;
        self.jammed = false;

        let irq = self.irq_latch.is_recognised(IRQ_RECOGNISED);
        let nmi = self.nmi_latch.is_recognised(NMI_RECOGNISED);
        let before = self.hijack;
        self.hijack = self.hijack.resolve(irq, nmi);
        self.irq_latch.truncate();
        self.nmi_latch.truncate();

        if self.hijack == Hijack::None {
            self.ir = self.pins.data;
            self.regs.pc = self.regs.pc.wrapping_add(1);
        } else {
            self.ir = 0x00;
            if self.hijack != before {
                debug!("{:?} taken at PC={:04X}", self.hijack, self.regs.pc);
            }
        }
        self.step = 0;
    }

    /// The two half-cycles after RES is released are spent loading the high
    /// byte of the PC from the data pins. Returns true once the forced BRK
    /// may run.
    fn advance_reset(&mut self) -> bool {
        self.reset_step = self.reset_step.saturating_add(1);
        match self.reset_step {
            1 => false,
            2 => {
                self.regs.pc = (u16::from(self.pins.data) << 8) | (self.regs.pc & 0x00FF);
                self.pins.address = self.regs.pc;
                self.pins.sync = true;
                false
            }
            _ => true,
        }
    }

    fn commit_pending(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        if let Some(a) = pending.a {
            self.regs.a = a;
        }
        if let Some(x) = pending.x {
            self.regs.x = x;
        }
        if let Some(y) = pending.y {
            self.regs.y = y;
        }
        if let Some(s) = pending.s {
            self.regs.s = s;
        }
    }

    // === Microcode primitives ===

    pub(crate) fn set_a(&mut self, value: u8) {
        self.pending.a = Some(value);
    }

    pub(crate) fn set_x(&mut self, value: u8) {
        self.pending.x = Some(value);
    }

    pub(crate) fn set_y(&mut self, value: u8) {
        self.pending.y = Some(value);
    }

    pub(crate) fn set_s(&mut self, value: u8) {
        self.pending.s = Some(value);
    }

    /// Data the bus left on the pins last cycle.
    pub(crate) fn data(&self) -> u8 {
        self.pins.data
    }

    /// Put a read of `address` on the bus.
    pub(crate) fn set_address(&mut self, address: u16) {
        self.pins.address = address;
    }

    /// Put a write of `value` to `address` on the bus.
    pub(crate) fn write(&mut self, address: u16, value: u8) {
        self.pins.address = address;
        self.write_here(value);
    }

    /// Turn this cycle into a write to the address already on the pins.
    pub(crate) fn write_here(&mut self, value: u8) {
        self.pins.rw = false;
        self.data_out = Some(value);
    }

    /// PC, post-incremented.
    pub(crate) fn next_pc(&mut self) -> u16 {
        let pc = self.regs.pc;
        self.regs.pc = pc.wrapping_add(1);
        pc
    }

    /// Fetch the next opcode.
    pub(crate) fn fetch(&mut self) {
        self.pins.address = self.regs.pc;
        self.pins.sync = true;
    }

    pub(crate) const fn decimal_enabled(&self) -> bool {
        self.options.decimal_enabled
    }

    // === Pins ===

    #[must_use]
    pub const fn pins(&self) -> &Pins {
        &self.pins
    }

    /// Drive D0-D7, as the bus does on a read.
    pub fn set_data(&mut self, value: u8) {
        self.pins.data = value;
    }

    /// Drive RES. `false` holds the chip in reset.
    ///
    /// While held, the core ignores the clock. On release it spends two
    /// cycles loading the PC high byte, then runs the reset sequence, which
    /// reads the stack instead of writing it and takes the vector at $FFFC.
    pub fn set_reset(&mut self, level: bool) {
        let was = self.pins.res;
        self.pins.res = level;
        if !level {
            if was {
                debug!("reset asserted at PC={:04X}", self.regs.pc);
            }
            self.hijack = Hijack::Reset;
            self.pins.rw = true;
            self.data_out = None;
        } else if !was {
            debug!("reset released");
            self.reset_step = 0;
        }
    }

    /// Drive IRQ. `false` requests an interrupt while the line stays low.
    pub fn set_irq(&mut self, level: bool) {
        self.pins.irq = level;
    }

    /// Drive NMI. A high-to-low transition requests one interrupt.
    pub fn set_nmi(&mut self, level: bool) {
        self.pins.nmi = level;
    }

    /// Request a halt. `true` freezes the core on the next read cycle.
    pub fn set_rdy(&mut self, halt: bool) {
        self.pins.rdy = halt;
    }

    // === Inspection ===

    #[must_use]
    pub const fn a(&self) -> u8 {
        self.regs.a
    }

    #[must_use]
    pub const fn x(&self) -> u8 {
        self.regs.x
    }

    #[must_use]
    pub const fn y(&self) -> u8 {
        self.regs.y
    }

    #[must_use]
    pub const fn s(&self) -> u8 {
        self.regs.s
    }

    #[must_use]
    pub const fn p(&self) -> Status {
        self.regs.p
    }

    /// Status register as it reads back through PHP, with B clear.
    #[must_use]
    pub const fn p_byte(&self) -> u8 {
        self.regs.p.to_byte(false)
    }

    #[must_use]
    pub const fn ir(&self) -> u8 {
        self.ir
    }

    /// Microcode step within the current instruction.
    #[must_use]
    pub const fn step(&self) -> u8 {
        self.step
    }

    /// True during the bus cycle that fetches an opcode.
    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        self.pins.sync
    }

    /// Forced BRK waiting for, or running in, the current instruction.
    #[must_use]
    pub const fn hijack(&self) -> Hijack {
        self.hijack
    }

    /// True if the last falling edge was swallowed by RDY.
    #[must_use]
    pub const fn is_stalled(&self) -> bool {
        self.stalled
    }

    #[must_use]
    pub const fn is_jammed(&self) -> bool {
        self.jammed
    }

    #[must_use]
    pub const fn options(&self) -> Options {
        self.options
    }

    /// Cycles run since power-on, stalls included.
    #[must_use]
    pub const fn total_cycles(&self) -> u64 {
        self.total_cycles
    }
}

impl Cpu for Mos6502 {
    type Registers = Registers;

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.jammed
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.p_byte().into()),
            "flags.c" | "c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" | "z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" | "i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" | "d" => Some(self.regs.p.is_set(D).into()),
            "flags.v" | "v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" | "n" => Some(self.regs.p.is_set(N).into()),
            "ir" => Some(self.ir.into()),
            "step" => Some(self.step.into()),
            "sync" => Some(self.pins.sync.into()),
            "rw" => Some(self.pins.rw.into()),
            "address" => Some(self.pins.address.into()),
            "data" => Some(self.pins.data.into()),
            "cycle" => Some(Value::U64(self.total_cycles)),
            "jammed" => Some(self.jammed.into()),
            "irq_latch" => Some(self.irq_latch.bits().into()),
            "nmi_latch" => Some(self.nmi_latch.bits().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "s", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.v",
            "flags.n", "ir", "step", "sync", "rw", "address", "data", "cycle", "jammed",
            "irq_latch", "nmi_latch",
        ]
    }
}
