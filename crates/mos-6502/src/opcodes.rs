//! Opcode metadata: mnemonic, addressing mode and base cycle count.
//!
//! The microcode in [`crate::microcode`] is the authority on what each opcode
//! does. This table is what tools need without running anything: the
//! disassembler, and tests that cross-check timing.

/// Operand addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

impl AddressingMode {
    /// Total instruction length, opcode included.
    #[must_use]
    pub const fn length(self) -> u16 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 3,
            _ => 2,
        }
    }

    /// Microcode steps spent before the operand is on the data pins (reads)
    /// or the effective address is on the address pins (the last of these
    /// steps, for writes).
    pub(crate) const fn address_steps(self) -> u8 {
        match self {
            AddressingMode::Immediate => 1,
            AddressingMode::ZeroPage => 2,
            AddressingMode::ZeroPageX | AddressingMode::ZeroPageY | AddressingMode::Absolute => 3,
            AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => 4,
            AddressingMode::IndirectX | AddressingMode::IndirectY => 5,
            AddressingMode::Implied
            | AddressingMode::Accumulator
            | AddressingMode::Indirect
            | AddressingMode::Relative => 0,
        }
    }
}

/// Static description of one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// Uppercase mnemonic. Undocumented opcodes use their common names
    /// (`SLO`, `LAX`, `JAM`, ...).
    pub mnemonic: &'static str,
    pub mode: AddressingMode,
    /// Cycles without page-cross or branch penalties. Zero for JAM.
    pub cycles: u8,
}

impl Opcode {
    /// Whether the opcode is outside the documented NMOS set.
    #[must_use]
    pub fn is_undocumented(&self, opcode: u8) -> bool {
        matches!(
            self.mnemonic,
            "SLO" | "RLA" | "SRE" | "RRA" | "SAX" | "LAX" | "DCP" | "ISB" | "ANC" | "ALR"
                | "ARR" | "ANE" | "LXA" | "SBX" | "LAS" | "SHA" | "SHX" | "SHY" | "TAS" | "JAM"
        ) || (self.mnemonic == "NOP" && opcode != 0xEA)
            || opcode == 0xEB
    }
}

const fn op(mnemonic: &'static str, mode: AddressingMode, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        mode,
        cycles,
    }
}

use AddressingMode::{
    Absolute, AbsoluteX, AbsoluteY, Accumulator, Immediate, Implied, Indirect, IndirectX,
    IndirectY, Relative, ZeroPage, ZeroPageX, ZeroPageY,
};

/// All 256 NMOS opcodes, indexed by opcode byte.
pub static OPCODES: [Opcode; 256] = [
    op("BRK", Implied, 7), // 00
    op("ORA", IndirectX, 6), // 01
    op("JAM", Implied, 0), // 02
    op("SLO", IndirectX, 8), // 03
    op("NOP", ZeroPage, 3), // 04
    op("ORA", ZeroPage, 3), // 05
    op("ASL", ZeroPage, 5), // 06
    op("SLO", ZeroPage, 5), // 07
    op("PHP", Implied, 3), // 08
    op("ORA", Immediate, 2), // 09
    op("ASL", Accumulator, 2), // 0A
    op("ANC", Immediate, 2), // 0B
    op("NOP", Absolute, 4), // 0C
    op("ORA", Absolute, 4), // 0D
    op("ASL", Absolute, 6), // 0E
    op("SLO", Absolute, 6), // 0F
    op("BPL", Relative, 2), // 10
    op("ORA", IndirectY, 5), // 11
    op("JAM", Implied, 0), // 12
    op("SLO", IndirectY, 8), // 13
    op("NOP", ZeroPageX, 4), // 14
    op("ORA", ZeroPageX, 4), // 15
    op("ASL", ZeroPageX, 6), // 16
    op("SLO", ZeroPageX, 6), // 17
    op("CLC", Implied, 2), // 18
    op("ORA", AbsoluteY, 4), // 19
    op("NOP", Implied, 2), // 1A
    op("SLO", AbsoluteY, 7), // 1B
    op("NOP", AbsoluteX, 4), // 1C
    op("ORA", AbsoluteX, 4), // 1D
    op("ASL", AbsoluteX, 7), // 1E
    op("SLO", AbsoluteX, 7), // 1F
    op("JSR", Absolute, 6), // 20
    op("AND", IndirectX, 6), // 21
    op("JAM", Implied, 0), // 22
    op("RLA", IndirectX, 8), // 23
    op("BIT", ZeroPage, 3), // 24
    op("AND", ZeroPage, 3), // 25
    op("ROL", ZeroPage, 5), // 26
    op("RLA", ZeroPage, 5), // 27
    op("PLP", Implied, 4), // 28
    op("AND", Immediate, 2), // 29
    op("ROL", Accumulator, 2), // 2A
    op("ANC", Immediate, 2), // 2B
    op("BIT", Absolute, 4), // 2C
    op("AND", Absolute, 4), // 2D
    op("ROL", Absolute, 6), // 2E
    op("RLA", Absolute, 6), // 2F
    op("BMI", Relative, 2), // 30
    op("AND", IndirectY, 5), // 31
    op("JAM", Implied, 0), // 32
    op("RLA", IndirectY, 8), // 33
    op("NOP", ZeroPageX, 4), // 34
    op("AND", ZeroPageX, 4), // 35
    op("ROL", ZeroPageX, 6), // 36
    op("RLA", ZeroPageX, 6), // 37
    op("SEC", Implied, 2), // 38
    op("AND", AbsoluteY, 4), // 39
    op("NOP", Implied, 2), // 3A
    op("RLA", AbsoluteY, 7), // 3B
    op("NOP", AbsoluteX, 4), // 3C
    op("AND", AbsoluteX, 4), // 3D
    op("ROL", AbsoluteX, 7), // 3E
    op("RLA", AbsoluteX, 7), // 3F
    op("RTI", Implied, 6), // 40
    op("EOR", IndirectX, 6), // 41
    op("JAM", Implied, 0), // 42
    op("SRE", IndirectX, 8), // 43
    op("NOP", ZeroPage, 3), // 44
    op("EOR", ZeroPage, 3), // 45
    op("LSR", ZeroPage, 5), // 46
    op("SRE", ZeroPage, 5), // 47
    op("PHA", Implied, 3), // 48
    op("EOR", Immediate, 2), // 49
    op("LSR", Accumulator, 2), // 4A
    op("ALR", Immediate, 2), // 4B
    op("JMP", Absolute, 3), // 4C
    op("EOR", Absolute, 4), // 4D
    op("LSR", Absolute, 6), // 4E
    op("SRE", Absolute, 6), // 4F
    op("BVC", Relative, 2), // 50
    op("EOR", IndirectY, 5), // 51
    op("JAM", Implied, 0), // 52
    op("SRE", IndirectY, 8), // 53
    op("NOP", ZeroPageX, 4), // 54
    op("EOR", ZeroPageX, 4), // 55
    op("LSR", ZeroPageX, 6), // 56
    op("SRE", ZeroPageX, 6), // 57
    op("CLI", Implied, 2), // 58
    op("EOR", AbsoluteY, 4), // 59
    op("NOP", Implied, 2), // 5A
    op("SRE", AbsoluteY, 7), // 5B
    op("NOP", AbsoluteX, 4), // 5C
    op("EOR", AbsoluteX, 4), // 5D
    op("LSR", AbsoluteX, 7), // 5E
    op("SRE", AbsoluteX, 7), // 5F
    op("RTS", Implied, 6), // 60
    op("ADC", IndirectX, 6), // 61
    op("JAM", Implied, 0), // 62
    op("RRA", IndirectX, 8), // 63
    op("NOP", ZeroPage, 3), // 64
    op("ADC", ZeroPage, 3), // 65
    op("ROR", ZeroPage, 5), // 66
    op("RRA", ZeroPage, 5), // 67
    op("PLA", Implied, 4), // 68
    op("ADC", Immediate, 2), // 69
    op("ROR", Accumulator, 2), // 6A
    op("ARR", Immediate, 2), // 6B
    op("JMP", Indirect, 5), // 6C
    op("ADC", Absolute, 4), // 6D
    op("ROR", Absolute, 6), // 6E
    op("RRA", Absolute, 6), // 6F
    op("BVS", Relative, 2), // 70
    op("ADC", IndirectY, 5), // 71
    op("JAM", Implied, 0), // 72
    op("RRA", IndirectY, 8), // 73
    op("NOP", ZeroPageX, 4), // 74
    op("ADC", ZeroPageX, 4), // 75
    op("ROR", ZeroPageX, 6), // 76
    op("RRA", ZeroPageX, 6), // 77
    op("SEI", Implied, 2), // 78
    op("ADC", AbsoluteY, 4), // 79
    op("NOP", Implied, 2), // 7A
    op("RRA", AbsoluteY, 7), // 7B
    op("NOP", AbsoluteX, 4), // 7C
    op("ADC", AbsoluteX, 4), // 7D
    op("ROR", AbsoluteX, 7), // 7E
    op("RRA", AbsoluteX, 7), // 7F
    op("NOP", Immediate, 2), // 80
    op("STA", IndirectX, 6), // 81
    op("NOP", Immediate, 2), // 82
    op("SAX", IndirectX, 6), // 83
    op("STY", ZeroPage, 3), // 84
    op("STA", ZeroPage, 3), // 85
    op("STX", ZeroPage, 3), // 86
    op("SAX", ZeroPage, 3), // 87
    op("DEY", Implied, 2), // 88
    op("NOP", Immediate, 2), // 89
    op("TXA", Implied, 2), // 8A
    op("ANE", Immediate, 2), // 8B
    op("STY", Absolute, 4), // 8C
    op("STA", Absolute, 4), // 8D
    op("STX", Absolute, 4), // 8E
    op("SAX", Absolute, 4), // 8F
    op("BCC", Relative, 2), // 90
    op("STA", IndirectY, 6), // 91
    op("JAM", Implied, 0), // 92
    op("SHA", IndirectY, 6), // 93
    op("STY", ZeroPageX, 4), // 94
    op("STA", ZeroPageX, 4), // 95
    op("STX", ZeroPageY, 4), // 96
    op("SAX", ZeroPageY, 4), // 97
    op("TYA", Implied, 2), // 98
    op("STA", AbsoluteY, 5), // 99
    op("TXS", Implied, 2), // 9A
    op("TAS", AbsoluteY, 5), // 9B
    op("SHY", AbsoluteX, 5), // 9C
    op("STA", AbsoluteX, 5), // 9D
    op("SHX", AbsoluteY, 5), // 9E
    op("SHA", AbsoluteY, 5), // 9F
    op("LDY", Immediate, 2), // A0
    op("LDA", IndirectX, 6), // A1
    op("LDX", Immediate, 2), // A2
    op("LAX", IndirectX, 6), // A3
    op("LDY", ZeroPage, 3), // A4
    op("LDA", ZeroPage, 3), // A5
    op("LDX", ZeroPage, 3), // A6
    op("LAX", ZeroPage, 3), // A7
    op("TAY", Implied, 2), // A8
    op("LDA", Immediate, 2), // A9
    op("TAX", Implied, 2), // AA
    op("LXA", Immediate, 2), // AB
    op("LDY", Absolute, 4), // AC
    op("LDA", Absolute, 4), // AD
    op("LDX", Absolute, 4), // AE
    op("LAX", Absolute, 4), // AF
    op("BCS", Relative, 2), // B0
    op("LDA", IndirectY, 5), // B1
    op("JAM", Implied, 0), // B2
    op("LAX", IndirectY, 5), // B3
    op("LDY", ZeroPageX, 4), // B4
    op("LDA", ZeroPageX, 4), // B5
    op("LDX", ZeroPageY, 4), // B6
    op("LAX", ZeroPageY, 4), // B7
    op("CLV", Implied, 2), // B8
    op("LDA", AbsoluteY, 4), // B9
    op("TSX", Implied, 2), // BA
    op("LAS", AbsoluteY, 4), // BB
    op("LDY", AbsoluteX, 4), // BC
    op("LDA", AbsoluteX, 4), // BD
    op("LDX", AbsoluteY, 4), // BE
    op("LAX", AbsoluteY, 4), // BF
    op("CPY", Immediate, 2), // C0
    op("CMP", IndirectX, 6), // C1
    op("NOP", Immediate, 2), // C2
    op("DCP", IndirectX, 8), // C3
    op("CPY", ZeroPage, 3), // C4
    op("CMP", ZeroPage, 3), // C5
    op("DEC", ZeroPage, 5), // C6
    op("DCP", ZeroPage, 5), // C7
    op("INY", Implied, 2), // C8
    op("CMP", Immediate, 2), // C9
    op("DEX", Implied, 2), // CA
    op("SBX", Immediate, 2), // CB
    op("CPY", Absolute, 4), // CC
    op("CMP", Absolute, 4), // CD
    op("DEC", Absolute, 6), // CE
    op("DCP", Absolute, 6), // CF
    op("BNE", Relative, 2), // D0
    op("CMP", IndirectY, 5), // D1
    op("JAM", Implied, 0), // D2
    op("DCP", IndirectY, 8), // D3
    op("NOP", ZeroPageX, 4), // D4
    op("CMP", ZeroPageX, 4), // D5
    op("DEC", ZeroPageX, 6), // D6
    op("DCP", ZeroPageX, 6), // D7
    op("CLD", Implied, 2), // D8
    op("CMP", AbsoluteY, 4), // D9
    op("NOP", Implied, 2), // DA
    op("DCP", AbsoluteY, 7), // DB
    op("NOP", AbsoluteX, 4), // DC
    op("CMP", AbsoluteX, 4), // DD
    op("DEC", AbsoluteX, 7), // DE
    op("DCP", AbsoluteX, 7), // DF
    op("CPX", Immediate, 2), // E0
    op("SBC", IndirectX, 6), // E1
    op("NOP", Immediate, 2), // E2
    op("ISB", IndirectX, 8), // E3
    op("CPX", ZeroPage, 3), // E4
    op("SBC", ZeroPage, 3), // E5
    op("INC", ZeroPage, 5), // E6
    op("ISB", ZeroPage, 5), // E7
    op("INX", Implied, 2), // E8
    op("SBC", Immediate, 2), // E9
    op("NOP", Implied, 2), // EA
    op("SBC", Immediate, 2), // EB
    op("CPX", Absolute, 4), // EC
    op("SBC", Absolute, 4), // ED
    op("INC", Absolute, 6), // EE
    op("ISB", Absolute, 6), // EF
    op("BEQ", Relative, 2), // F0
    op("SBC", IndirectY, 5), // F1
    op("JAM", Implied, 0), // F2
    op("ISB", IndirectY, 8), // F3
    op("NOP", ZeroPageX, 4), // F4
    op("SBC", ZeroPageX, 4), // F5
    op("INC", ZeroPageX, 6), // F6
    op("ISB", ZeroPageX, 6), // F7
    op("SED", Implied, 2), // F8
    op("SBC", AbsoluteY, 4), // F9
    op("NOP", Implied, 2), // FA
    op("ISB", AbsoluteY, 7), // FB
    op("NOP", AbsoluteX, 4), // FC
    op("SBC", AbsoluteX, 4), // FD
    op("INC", AbsoluteX, 7), // FE
    op("ISB", AbsoluteX, 7), // FF
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_follow_mode() {
        assert_eq!(OPCODES[0xA9].mode.length(), 2);
        assert_eq!(OPCODES[0x6C].mode.length(), 3);
        assert_eq!(OPCODES[0x0A].mode.length(), 1);
        assert_eq!(OPCODES[0xD0].mode.length(), 2);
    }

    #[test]
    fn documented_set_has_151_opcodes() {
        let documented = (0..=0xFFu8)
            .filter(|&code| !OPCODES[usize::from(code)].is_undocumented(code))
            .count();
        assert_eq!(documented, 151);
    }

    #[test]
    fn twelve_jams() {
        let jams = OPCODES.iter().filter(|op| op.mnemonic == "JAM").count();
        assert_eq!(jams, 12);
    }
}
