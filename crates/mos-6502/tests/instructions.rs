//! Instruction behaviour, driven through the pins like a real board would.

use emu_core::{Cpu, SimpleBus};
use mos_6502::{Mos6502, Options, flags};

const START: u16 = 0x0200;

struct Machine {
    cpu: Mos6502,
    bus: SimpleBus,
}

impl Machine {
    fn new(program: &[u8]) -> Self {
        Self::with_options(Options::default(), program)
    }

    /// Load `program` at $0200, reset, and stop at its first opcode fetch.
    fn with_options(options: Options, program: &[u8]) -> Self {
        let mut bus = SimpleBus::new();
        bus.load(START, program);
        bus.poke_word(0xFFFC, START);

        let mut machine = Self {
            cpu: Mos6502::new(options),
            bus,
        };
        machine.cpu.set_reset(false);
        machine.cycle();
        machine.cycle();
        machine.cpu.set_reset(true);
        for _ in 0..20 {
            machine.cycle();
            if machine.cpu.is_fetching() && machine.cpu.pins().address == START {
                return machine;
            }
        }
        panic!("reset did not reach ${START:04X}");
    }

    fn cycle(&mut self) {
        self.cpu.tick();
        self.cpu.service(&mut self.bus);
    }

    /// Run one instruction, returning its cycle count.
    fn step(&mut self) -> u32 {
        for cycles in 1..=20 {
            self.cycle();
            if self.cpu.is_fetching() {
                return cycles;
            }
        }
        panic!("instruction did not complete within 20 cycles");
    }

    /// Run `count` instructions and let their register writes land.
    fn run(&mut self, count: usize) {
        for _ in 0..count {
            self.step();
        }
        self.cpu.set_phase(false);
    }
}

#[test]
fn test_stack_pha_pla() {
    let mut m = Machine::new(&[
        0xA9, 0x42, // LDA #$42
        0xA2, 0xFF, // LDX #$FF
        0x9A, // TXS
        0x48, // PHA
        0xA9, 0x00, // LDA #$00
        0x68, // PLA
    ]);
    m.run(6);

    assert_eq!(m.cpu.a(), 0x42, "PLA should restore A");
    assert_eq!(m.cpu.s(), 0xFF, "SP should be back to $FF after PLA");
    assert_eq!(m.bus.peek(0x01FF), 0x42);
}

#[test]
fn test_stack_php_plp() {
    let mut m = Machine::new(&[
        0xA2, 0xFF, // LDX #$FF
        0x9A, // TXS
        0x38, // SEC
        0x08, // PHP
        0x18, // CLC
        0x28, // PLP
    ]);
    m.run(6);

    assert!(m.cpu.p().is_set(flags::C), "PLP should restore carry");
    // N from LDX, I from reset, C, plus B and bit 5 in the pushed copy.
    assert_eq!(
        m.bus.peek(0x01FF),
        flags::N | flags::I | flags::C | flags::B | flags::U
    );
}

#[test]
fn test_jsr_rts() {
    let mut m = Machine::new(&[
        0x20, 0x00, 0x03, // JSR $0300
        0xA9, 0x01, // LDA #$01
    ]);
    m.bus.load(0x0300, &[0xA2, 0x05, 0x60]); // LDX #$05 ; RTS
    let s = m.cpu.s();
    m.run(4);

    assert_eq!(m.cpu.x(), 0x05);
    assert_eq!(m.cpu.a(), 0x01);
    assert_eq!(m.cpu.s(), s);
    // Return address minus one.
    assert_eq!(m.bus.peek(0x0100 | u16::from(s)), 0x02);
    assert_eq!(m.bus.peek(0x0100 | u16::from(s.wrapping_sub(1))), 0x02);
}

#[test]
fn test_jmp_indirect_page_wrap() {
    let mut m = Machine::new(&[0x6C, 0xFF, 0x10]); // JMP ($10FF)
    m.bus.poke(0x10FF, 0x34);
    m.bus.poke(0x1000, 0x12);
    m.bus.poke(0x1100, 0x56);

    assert_eq!(m.step(), 5);
    assert_eq!(m.cpu.pins().address, 0x1234);
    assert_eq!(m.cpu.pc(), 0x1234);
}

#[test]
fn test_indexed_zero_page_wraps() {
    let mut m = Machine::new(&[
        0xA2, 0x10, // LDX #$10
        0xB5, 0xF8, // LDA $F8,X -> $0008
        0xA1, 0xF8, // LDA ($F8,X) -> pointer at $08/$09
    ]);
    m.bus.poke(0x0008, 0x00);
    m.bus.poke(0x0009, 0x04);
    m.bus.poke(0x0108, 0xEE);
    m.bus.poke(0x0400, 0x77);

    m.run(2);
    assert_eq!(m.cpu.a(), 0x00);
    m.run(1);
    assert_eq!(m.cpu.a(), 0x77);
}

#[test]
fn test_adc_decimal_mode() {
    let program = [
        0xF8, // SED
        0x18, // CLC
        0xA9, 0x09, // LDA #$09
        0x69, 0x01, // ADC #$01
    ];

    let mut m = Machine::new(&program);
    m.run(4);
    assert_eq!(m.cpu.a(), 0x10);

    let mut m = Machine::with_options(Options::nes(), &program);
    m.run(4);
    assert_eq!(m.cpu.a(), 0x0A, "decimal disabled ignores D");
}

#[test]
fn test_sbc_decimal_mode() {
    let mut m = Machine::new(&[
        0xF8, // SED
        0x38, // SEC
        0xA9, 0x10, // LDA #$10
        0xE9, 0x01, // SBC #$01
    ]);
    m.run(4);
    assert_eq!(m.cpu.a(), 0x09);
    assert!(m.cpu.p().is_set(flags::C));
}

#[test]
fn test_inc_dec_memory() {
    let mut m = Machine::new(&[
        0xE6, 0x10, // INC $10
        0xCE, 0x00, 0x12, // DEC $1200
    ]);
    m.bus.poke(0x0010, 0xFF);
    m.bus.poke(0x1200, 0x01);
    m.run(2);

    assert_eq!(m.bus.peek(0x0010), 0x00);
    assert_eq!(m.bus.peek(0x1200), 0x00);
    assert!(m.cpu.p().is_set(flags::Z));
}

#[test]
fn test_bit_copies_high_bits() {
    let mut m = Machine::new(&[
        0xA9, 0x01, // LDA #$01
        0x24, 0x10, // BIT $10
    ]);
    m.bus.poke(0x0010, 0xC0);
    m.run(2);

    let p = m.cpu.p();
    assert!(p.is_set(flags::N) && p.is_set(flags::V) && p.is_set(flags::Z));
}

#[test]
fn test_transfers() {
    let mut m = Machine::new(&[
        0xA9, 0x80, // LDA #$80
        0xAA, // TAX
        0xA8, // TAY
        0xE8, // INX
        0x88, // DEY
        0xBA, // TSX
    ]);
    m.run(5);
    assert_eq!(m.cpu.x(), 0x81);
    assert_eq!(m.cpu.y(), 0x7F);
    m.run(1);
    assert_eq!(m.cpu.x(), m.cpu.s());
}

#[test]
fn test_lax_and_sax() {
    let mut m = Machine::new(&[
        0xA7, 0x20, // LAX $20
        0xA9, 0xF0, // LDA #$F0
        0xA2, 0x3C, // LDX #$3C
        0x87, 0x21, // SAX $21
    ]);
    m.bus.poke(0x0020, 0x5A);
    m.run(1);
    assert_eq!(m.cpu.a(), 0x5A);
    assert_eq!(m.cpu.x(), 0x5A);

    m.run(3);
    assert_eq!(m.bus.peek(0x0021), 0x30);
}

#[test]
fn test_dcp_and_isb() {
    let mut m = Machine::new(&[
        0xA9, 0x42, // LDA #$42
        0xC7, 0x10, // DCP $10
        0x38, // SEC
        0xA9, 0x05, // LDA #$05
        0xE7, 0x11, // ISB $11
    ]);
    m.bus.poke(0x0010, 0x43);
    m.bus.poke(0x0011, 0x00);

    m.run(2);
    assert_eq!(m.bus.peek(0x0010), 0x42);
    assert!(m.cpu.p().is_set(flags::Z) && m.cpu.p().is_set(flags::C));

    m.run(3);
    assert_eq!(m.bus.peek(0x0011), 0x01);
    assert_eq!(m.cpu.a(), 0x04);
}

#[test]
fn test_slo_and_rra() {
    let mut m = Machine::new(&[
        0xA9, 0x01, // LDA #$01
        0x07, 0x10, // SLO $10
        0x18, // CLC
        0xA9, 0x10, // LDA #$10
        0x67, 0x11, // RRA $11
    ]);
    m.bus.poke(0x0010, 0x81);
    m.bus.poke(0x0011, 0x03);

    m.run(2);
    assert_eq!(m.bus.peek(0x0010), 0x02);
    assert_eq!(m.cpu.a(), 0x03);
    assert!(m.cpu.p().is_set(flags::C));

    // ROR $03 -> $01 with carry out, then $10 + $01 + 1.
    m.run(3);
    assert_eq!(m.bus.peek(0x0011), 0x01);
    assert_eq!(m.cpu.a(), 0x12);
}

#[test]
fn test_immediate_undocumented() {
    let mut m = Machine::new(&[
        0xA9, 0xFF, // LDA #$FF
        0x0B, 0x80, // ANC #$80
    ]);
    m.run(2);
    assert_eq!(m.cpu.a(), 0x80);
    assert!(m.cpu.p().is_set(flags::C));

    let mut m = Machine::new(&[
        0xA9, 0x03, // LDA #$03
        0x4B, 0x03, // ALR #$03
    ]);
    m.run(2);
    assert_eq!(m.cpu.a(), 0x01);
    assert!(m.cpu.p().is_set(flags::C));

    let mut m = Machine::new(&[
        0xA9, 0xF0, // LDA #$F0
        0xA2, 0x3C, // LDX #$3C
        0xCB, 0x10, // SBX #$10
    ]);
    m.run(3);
    assert_eq!(m.cpu.x(), 0x20);
}

#[test]
fn test_jam_halts_until_reset() {
    let mut m = Machine::new(&[0x02]);
    for _ in 0..10 {
        m.cycle();
    }
    assert!(m.cpu.is_jammed());
    assert!(m.cpu.is_halted());
    assert_eq!(m.cpu.pins().address, 0xFFFF);
    assert!(!m.cpu.is_fetching());

    m.bus.load(START, &[0xEA]);
    m.cpu.set_reset(false);
    m.cycle();
    m.cpu.set_reset(true);
    let mut fetched = false;
    for _ in 0..20 {
        m.cycle();
        if m.cpu.is_fetching() && m.cpu.pins().address == START {
            fetched = true;
            break;
        }
    }
    assert!(fetched);
    assert!(!m.cpu.is_jammed());
}
