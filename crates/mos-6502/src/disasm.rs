//! Disassembler for debuggers and trace logs.

use std::fmt;

use crate::opcodes::{AddressingMode, OPCODES};

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// Address of the opcode byte.
    pub address: u16,
    /// Assembly text, e.g. `LDA ($20),Y` or `BNE $C004`.
    pub text: String,
    /// Bytes occupied, opcode included.
    pub length: u16,
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}  {}", self.address, self.text)
    }
}

/// Decode the instruction at `address`.
///
/// `read` must not have side effects; it is called for the opcode and its
/// operand bytes only. Addresses wrap at $FFFF.
pub fn disassemble(address: u16, mut read: impl FnMut(u16) -> u8) -> DecodedInstruction {
    let opcode = read(address);
    let entry = &OPCODES[usize::from(opcode)];
    let length = entry.mode.length();

    let lo = if length > 1 { read(address.wrapping_add(1)) } else { 0 };
    let hi = if length > 2 { read(address.wrapping_add(2)) } else { 0 };
    let word = u16::from_le_bytes([lo, hi]);

    let operand = match entry.mode {
        AddressingMode::Implied => String::new(),
        AddressingMode::Accumulator => "A".to_string(),
        AddressingMode::Immediate => format!("#${lo:02X}"),
        AddressingMode::ZeroPage => format!("${lo:02X}"),
        AddressingMode::ZeroPageX => format!("${lo:02X},X"),
        AddressingMode::ZeroPageY => format!("${lo:02X},Y"),
        AddressingMode::Absolute => format!("${word:04X}"),
        AddressingMode::AbsoluteX => format!("${word:04X},X"),
        AddressingMode::AbsoluteY => format!("${word:04X},Y"),
        AddressingMode::Indirect => format!("(${word:04X})"),
        AddressingMode::IndirectX => format!("(${lo:02X},X)"),
        AddressingMode::IndirectY => format!("(${lo:02X}),Y"),
        AddressingMode::Relative => {
            let target = address.wrapping_add(2).wrapping_add(lo as i8 as u16);
            format!("${target:04X}")
        }
    };

    let text = if operand.is_empty() {
        entry.mnemonic.to_string()
    } else {
        format!("{} {operand}", entry.mnemonic)
    };

    DecodedInstruction {
        address,
        text,
        length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(address: u16, bytes: &[u8]) -> DecodedInstruction {
        disassemble(address, |a| {
            bytes
                .get(usize::from(a.wrapping_sub(address)))
                .copied()
                .unwrap_or(0)
        })
    }

    #[test]
    fn documented_modes() {
        assert_eq!(decode(0x8000, &[0xA9, 0x42]).text, "LDA #$42");
        assert_eq!(decode(0x8000, &[0x8D, 0x00, 0x80]).text, "STA $8000");
        assert_eq!(decode(0x8000, &[0xB1, 0x20]).text, "LDA ($20),Y");
        assert_eq!(decode(0x8000, &[0x61, 0x20]).text, "ADC ($20,X)");
        assert_eq!(decode(0x8000, &[0x6C, 0xFF, 0x10]).text, "JMP ($10FF)");
        assert_eq!(decode(0x8000, &[0x0A]).text, "ASL A");
        assert_eq!(decode(0x8000, &[0xB6, 0x10]).text, "LDX $10,Y");
        assert_eq!(decode(0x8000, &[0xEA]).length, 1);
        assert_eq!(decode(0x8000, &[0xA9, 0x42]).to_string(), "8000  LDA #$42");
    }

    #[test]
    fn branch_targets_are_absolute() {
        let backward = decode(0xC000, &[0xD0, 0xFE]);
        assert_eq!(backward.text, "BNE $C000");
        assert_eq!(backward.length, 2);
        assert_eq!(decode(0xC000, &[0x10, 0x10]).text, "BPL $C012");
    }

    #[test]
    fn undocumented_opcodes_use_common_names() {
        assert_eq!(decode(0x0200, &[0xA7, 0x10]).text, "LAX $10");
        assert_eq!(decode(0x0200, &[0x02]).text, "JAM");
        assert_eq!(decode(0x0200, &[0xDF, 0x34, 0x12]).text, "DCP $1234,X");
    }

    #[test]
    fn operand_reads_wrap() {
        let decoded = disassemble(0xFFFF, |a| match a {
            0xFFFF => 0x4C,
            0x0000 => 0x34,
            0x0001 => 0x12,
            _ => 0,
        });
        assert_eq!(decoded.text, "JMP $1234");
        assert_eq!(decoded.length, 3);
    }
}
