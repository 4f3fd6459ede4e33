//! Per-cycle microcode for all 256 NMOS opcodes.
//!
//! Each falling edge runs exactly one `(opcode, step)` entry. Step `n` sees
//! the data of the bus cycle set up by step `n - 1` and sets up the next one.
//! The final step of every instruction puts the PC on the bus with SYNC, so
//! the opcode fetch of the next instruction overlaps it.

use log::{trace, warn};

use crate::alu;
use crate::cpu::Mos6502;
use crate::flags::{C, D, I, N, V, Z};
use crate::interrupts::{Hijack, NMI_RECOGNISED};
use crate::Status;
use crate::opcodes::AddressingMode::{
    self, Absolute, AbsoluteX, AbsoluteY, Immediate, IndirectX, IndirectY, ZeroPage, ZeroPageX,
    ZeroPageY,
};

/// What the effective address is used for. Only reads may skip the indexed
/// fix-up cycle.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
    Modify,
}

type ReadOp = fn(&mut Mos6502, u8);
type ModifyOp = fn(&mut Mos6502, u8) -> u8;
type StoreValue = fn(&Mos6502) -> u8;

impl Mos6502 {
    /// Run one microcode step for the current opcode.
    pub(crate) fn execute(&mut self) {
        match self.ir {
            0x00 => self.brk(),
            0x01 => self.read_op(IndirectX, Self::ora),
            0x02 => self.jam(),
            0x03 => self.modify_op(IndirectX, Self::slo),
            0x04 => self.read_op(ZeroPage, Self::nop_read),
            0x05 => self.read_op(ZeroPage, Self::ora),
            0x06 => self.modify_op(ZeroPage, Self::asl),
            0x07 => self.modify_op(ZeroPage, Self::slo),
            0x08 => self.php(),
            0x09 => self.read_op(Immediate, Self::ora),
            0x0A => self.modify_accumulator(Self::asl),
            0x0B => self.read_op(Immediate, Self::anc),
            0x0C => self.read_op(Absolute, Self::nop_read),
            0x0D => self.read_op(Absolute, Self::ora),
            0x0E => self.modify_op(Absolute, Self::asl),
            0x0F => self.modify_op(Absolute, Self::slo),

            0x10 => self.branch(!self.regs.p.is_set(N)),
            0x11 => self.read_op(IndirectY, Self::ora),
            0x12 => self.jam(),
            0x13 => self.modify_op(IndirectY, Self::slo),
            0x14 => self.read_op(ZeroPageX, Self::nop_read),
            0x15 => self.read_op(ZeroPageX, Self::ora),
            0x16 => self.modify_op(ZeroPageX, Self::asl),
            0x17 => self.modify_op(ZeroPageX, Self::slo),
            0x18 => self.implied(|c| c.regs.p.clear(C)),
            0x19 => self.read_op(AbsoluteY, Self::ora),
            0x1A => self.implied(|_| {}),
            0x1B => self.modify_op(AbsoluteY, Self::slo),
            0x1C => self.read_op(AbsoluteX, Self::nop_read),
            0x1D => self.read_op(AbsoluteX, Self::ora),
            0x1E => self.modify_op(AbsoluteX, Self::asl),
            0x1F => self.modify_op(AbsoluteX, Self::slo),

            0x20 => self.jsr(),
            0x21 => self.read_op(IndirectX, Self::and),
            0x22 => self.jam(),
            0x23 => self.modify_op(IndirectX, Self::rla),
            0x24 => self.read_op(ZeroPage, Self::bit),
            0x25 => self.read_op(ZeroPage, Self::and),
            0x26 => self.modify_op(ZeroPage, Self::rol),
            0x27 => self.modify_op(ZeroPage, Self::rla),
            0x28 => self.plp(),
            0x29 => self.read_op(Immediate, Self::and),
            0x2A => self.modify_accumulator(Self::rol),
            0x2B => self.read_op(Immediate, Self::anc),
            0x2C => self.read_op(Absolute, Self::bit),
            0x2D => self.read_op(Absolute, Self::and),
            0x2E => self.modify_op(Absolute, Self::rol),
            0x2F => self.modify_op(Absolute, Self::rla),

            0x30 => self.branch(self.regs.p.is_set(N)),
            0x31 => self.read_op(IndirectY, Self::and),
            0x32 => self.jam(),
            0x33 => self.modify_op(IndirectY, Self::rla),
            0x34 => self.read_op(ZeroPageX, Self::nop_read),
            0x35 => self.read_op(ZeroPageX, Self::and),
            0x36 => self.modify_op(ZeroPageX, Self::rol),
            0x37 => self.modify_op(ZeroPageX, Self::rla),
            0x38 => self.implied(|c| c.regs.p.set(C)),
            0x39 => self.read_op(AbsoluteY, Self::and),
            0x3A => self.implied(|_| {}),
            0x3B => self.modify_op(AbsoluteY, Self::rla),
            0x3C => self.read_op(AbsoluteX, Self::nop_read),
            0x3D => self.read_op(AbsoluteX, Self::and),
            0x3E => self.modify_op(AbsoluteX, Self::rol),
            0x3F => self.modify_op(AbsoluteX, Self::rla),

            0x40 => self.rti(),
            0x41 => self.read_op(IndirectX, Self::eor),
            0x42 => self.jam(),
            0x43 => self.modify_op(IndirectX, Self::sre),
            0x44 => self.read_op(ZeroPage, Self::nop_read),
            0x45 => self.read_op(ZeroPage, Self::eor),
            0x46 => self.modify_op(ZeroPage, Self::lsr),
            0x47 => self.modify_op(ZeroPage, Self::sre),
            0x48 => self.pha(),
            0x49 => self.read_op(Immediate, Self::eor),
            0x4A => self.modify_accumulator(Self::lsr),
            0x4B => self.read_op(Immediate, Self::alr),
            0x4C => self.jmp_absolute(),
            0x4D => self.read_op(Absolute, Self::eor),
            0x4E => self.modify_op(Absolute, Self::lsr),
            0x4F => self.modify_op(Absolute, Self::sre),

            0x50 => self.branch(!self.regs.p.is_set(V)),
            0x51 => self.read_op(IndirectY, Self::eor),
            0x52 => self.jam(),
            0x53 => self.modify_op(IndirectY, Self::sre),
            0x54 => self.read_op(ZeroPageX, Self::nop_read),
            0x55 => self.read_op(ZeroPageX, Self::eor),
            0x56 => self.modify_op(ZeroPageX, Self::lsr),
            0x57 => self.modify_op(ZeroPageX, Self::sre),
            0x58 => self.implied(|c| c.regs.p.clear(I)),
            0x59 => self.read_op(AbsoluteY, Self::eor),
            0x5A => self.implied(|_| {}),
            0x5B => self.modify_op(AbsoluteY, Self::sre),
            0x5C => self.read_op(AbsoluteX, Self::nop_read),
            0x5D => self.read_op(AbsoluteX, Self::eor),
            0x5E => self.modify_op(AbsoluteX, Self::lsr),
            0x5F => self.modify_op(AbsoluteX, Self::sre),

            0x60 => self.rts(),
            0x61 => self.read_op(IndirectX, Self::adc),
            0x62 => self.jam(),
            0x63 => self.modify_op(IndirectX, Self::rra),
            0x64 => self.read_op(ZeroPage, Self::nop_read),
            0x65 => self.read_op(ZeroPage, Self::adc),
            0x66 => self.modify_op(ZeroPage, Self::ror),
            0x67 => self.modify_op(ZeroPage, Self::rra),
            0x68 => self.pla(),
            0x69 => self.read_op(Immediate, Self::adc),
            0x6A => self.modify_accumulator(Self::ror),
            0x6B => self.read_op(Immediate, Self::arr),
            0x6C => self.jmp_indirect(),
            0x6D => self.read_op(Absolute, Self::adc),
            0x6E => self.modify_op(Absolute, Self::ror),
            0x6F => self.modify_op(Absolute, Self::rra),

            0x70 => self.branch(self.regs.p.is_set(V)),
            0x71 => self.read_op(IndirectY, Self::adc),
            0x72 => self.jam(),
            0x73 => self.modify_op(IndirectY, Self::rra),
            0x74 => self.read_op(ZeroPageX, Self::nop_read),
            0x75 => self.read_op(ZeroPageX, Self::adc),
            0x76 => self.modify_op(ZeroPageX, Self::ror),
            0x77 => self.modify_op(ZeroPageX, Self::rra),
            0x78 => self.implied(|c| c.regs.p.set(I)),
            0x79 => self.read_op(AbsoluteY, Self::adc),
            0x7A => self.implied(|_| {}),
            0x7B => self.modify_op(AbsoluteY, Self::rra),
            0x7C => self.read_op(AbsoluteX, Self::nop_read),
            0x7D => self.read_op(AbsoluteX, Self::adc),
            0x7E => self.modify_op(AbsoluteX, Self::ror),
            0x7F => self.modify_op(AbsoluteX, Self::rra),

            0x80 => self.read_op(Immediate, Self::nop_read),
            0x81 => self.write_op(IndirectX, |c| c.regs.a),
            0x82 => self.read_op(Immediate, Self::nop_read),
            0x83 => self.write_op(IndirectX, |c| c.regs.a & c.regs.x),
            0x84 => self.write_op(ZeroPage, |c| c.regs.y),
            0x85 => self.write_op(ZeroPage, |c| c.regs.a),
            0x86 => self.write_op(ZeroPage, |c| c.regs.x),
            0x87 => self.write_op(ZeroPage, |c| c.regs.a & c.regs.x),
            0x88 => self.implied(|c| c.load_y(c.regs.y.wrapping_sub(1))),
            0x89 => self.read_op(Immediate, Self::nop_read),
            0x8A => self.implied(|c| c.load_a(c.regs.x)),
            0x8B => self.read_op(Immediate, Self::ane),
            0x8C => self.write_op(Absolute, |c| c.regs.y),
            0x8D => self.write_op(Absolute, |c| c.regs.a),
            0x8E => self.write_op(Absolute, |c| c.regs.x),
            0x8F => self.write_op(Absolute, |c| c.regs.a & c.regs.x),

            0x90 => self.branch(!self.regs.p.is_set(C)),
            0x91 => self.write_op(IndirectY, |c| c.regs.a),
            0x92 => self.jam(),
            0x93 => self.unstable_store(IndirectY, |c| c.regs.a & c.regs.x),
            0x94 => self.write_op(ZeroPageX, |c| c.regs.y),
            0x95 => self.write_op(ZeroPageX, |c| c.regs.a),
            0x96 => self.write_op(ZeroPageY, |c| c.regs.x),
            0x97 => self.write_op(ZeroPageY, |c| c.regs.a & c.regs.x),
            0x98 => self.implied(|c| c.load_a(c.regs.y)),
            0x99 => self.write_op(AbsoluteY, |c| c.regs.a),
            0x9A => self.implied(|c| c.set_s(c.regs.x)),
            0x9B => {
                if self.step == 0 {
                    self.set_s(self.regs.a & self.regs.x);
                }
                self.unstable_store(AbsoluteY, |c| c.regs.a & c.regs.x);
            }
            0x9C => self.unstable_store(AbsoluteX, |c| c.regs.y),
            0x9D => self.write_op(AbsoluteX, |c| c.regs.a),
            0x9E => self.unstable_store(AbsoluteY, |c| c.regs.x),
            0x9F => self.unstable_store(AbsoluteY, |c| c.regs.a & c.regs.x),

            0xA0 => self.read_op(Immediate, Self::load_y),
            0xA1 => self.read_op(IndirectX, Self::load_a),
            0xA2 => self.read_op(Immediate, Self::load_x),
            0xA3 => self.read_op(IndirectX, Self::lax),
            0xA4 => self.read_op(ZeroPage, Self::load_y),
            0xA5 => self.read_op(ZeroPage, Self::load_a),
            0xA6 => self.read_op(ZeroPage, Self::load_x),
            0xA7 => self.read_op(ZeroPage, Self::lax),
            0xA8 => self.implied(|c| c.load_y(c.regs.a)),
            0xA9 => self.read_op(Immediate, Self::load_a),
            0xAA => self.implied(|c| c.load_x(c.regs.a)),
            0xAB => self.read_op(Immediate, Self::lxa),
            0xAC => self.read_op(Absolute, Self::load_y),
            0xAD => self.read_op(Absolute, Self::load_a),
            0xAE => self.read_op(Absolute, Self::load_x),
            0xAF => self.read_op(Absolute, Self::lax),

            0xB0 => self.branch(self.regs.p.is_set(C)),
            0xB1 => self.read_op(IndirectY, Self::load_a),
            0xB2 => self.jam(),
            0xB3 => self.read_op(IndirectY, Self::lax),
            0xB4 => self.read_op(ZeroPageX, Self::load_y),
            0xB5 => self.read_op(ZeroPageX, Self::load_a),
            0xB6 => self.read_op(ZeroPageY, Self::load_x),
            0xB7 => self.read_op(ZeroPageY, Self::lax),
            0xB8 => self.implied(|c| c.regs.p.clear(V)),
            0xB9 => self.read_op(AbsoluteY, Self::load_a),
            0xBA => self.implied(|c| c.load_x(c.regs.s)),
            0xBB => self.read_op(AbsoluteY, Self::las),
            0xBC => self.read_op(AbsoluteX, Self::load_y),
            0xBD => self.read_op(AbsoluteX, Self::load_a),
            0xBE => self.read_op(AbsoluteY, Self::load_x),
            0xBF => self.read_op(AbsoluteY, Self::lax),

            0xC0 => self.read_op(Immediate, Self::cpy),
            0xC1 => self.read_op(IndirectX, Self::cmp),
            0xC2 => self.read_op(Immediate, Self::nop_read),
            0xC3 => self.modify_op(IndirectX, Self::dcp),
            0xC4 => self.read_op(ZeroPage, Self::cpy),
            0xC5 => self.read_op(ZeroPage, Self::cmp),
            0xC6 => self.modify_op(ZeroPage, Self::dec),
            0xC7 => self.modify_op(ZeroPage, Self::dcp),
            0xC8 => self.implied(|c| c.load_y(c.regs.y.wrapping_add(1))),
            0xC9 => self.read_op(Immediate, Self::cmp),
            0xCA => self.implied(|c| c.load_x(c.regs.x.wrapping_sub(1))),
            0xCB => self.read_op(Immediate, Self::sbx),
            0xCC => self.read_op(Absolute, Self::cpy),
            0xCD => self.read_op(Absolute, Self::cmp),
            0xCE => self.modify_op(Absolute, Self::dec),
            0xCF => self.modify_op(Absolute, Self::dcp),

            0xD0 => self.branch(!self.regs.p.is_set(Z)),
            0xD1 => self.read_op(IndirectY, Self::cmp),
            0xD2 => self.jam(),
            0xD3 => self.modify_op(IndirectY, Self::dcp),
            0xD4 => self.read_op(ZeroPageX, Self::nop_read),
            0xD5 => self.read_op(ZeroPageX, Self::cmp),
            0xD6 => self.modify_op(ZeroPageX, Self::dec),
            0xD7 => self.modify_op(ZeroPageX, Self::dcp),
            0xD8 => self.implied(|c| c.regs.p.clear(D)),
            0xD9 => self.read_op(AbsoluteY, Self::cmp),
            0xDA => self.implied(|_| {}),
            0xDB => self.modify_op(AbsoluteY, Self::dcp),
            0xDC => self.read_op(AbsoluteX, Self::nop_read),
            0xDD => self.read_op(AbsoluteX, Self::cmp),
            0xDE => self.modify_op(AbsoluteX, Self::dec),
            0xDF => self.modify_op(AbsoluteX, Self::dcp),

            0xE0 => self.read_op(Immediate, Self::cpx),
            0xE1 => self.read_op(IndirectX, Self::sbc),
            0xE2 => self.read_op(Immediate, Self::nop_read),
            0xE3 => self.modify_op(IndirectX, Self::isb),
            0xE4 => self.read_op(ZeroPage, Self::cpx),
            0xE5 => self.read_op(ZeroPage, Self::sbc),
            0xE6 => self.modify_op(ZeroPage, Self::inc),
            0xE7 => self.modify_op(ZeroPage, Self::isb),
            0xE8 => self.implied(|c| c.load_x(c.regs.x.wrapping_add(1))),
            0xE9 | 0xEB => self.read_op(Immediate, Self::sbc),
            0xEA => self.implied(|_| {}),
            0xEC => self.read_op(Absolute, Self::cpx),
            0xED => self.read_op(Absolute, Self::sbc),
            0xEE => self.modify_op(Absolute, Self::inc),
            0xEF => self.modify_op(Absolute, Self::isb),

            0xF0 => self.branch(self.regs.p.is_set(Z)),
            0xF1 => self.read_op(IndirectY, Self::sbc),
            0xF2 => self.jam(),
            0xF3 => self.modify_op(IndirectY, Self::isb),
            0xF4 => self.read_op(ZeroPageX, Self::nop_read),
            0xF5 => self.read_op(ZeroPageX, Self::sbc),
            0xF6 => self.modify_op(ZeroPageX, Self::inc),
            0xF7 => self.modify_op(ZeroPageX, Self::isb),
            0xF8 => self.implied(|c| c.regs.p.set(D)),
            0xF9 => self.read_op(AbsoluteY, Self::sbc),
            0xFA => self.implied(|_| {}),
            0xFB => self.modify_op(AbsoluteY, Self::isb),
            0xFC => self.read_op(AbsoluteX, Self::nop_read),
            0xFD => self.read_op(AbsoluteX, Self::sbc),
            0xFE => self.modify_op(AbsoluteX, Self::inc),
            0xFF => self.modify_op(AbsoluteX, Self::isb),
        }
    }

    fn invalid_step(&self) -> ! {
        unreachable!("opcode {:02X} has no step {}", self.ir, self.step)
    }

    // === Addressing ===

    /// One step of effective-address computation. The last step for `mode`
    /// leaves the effective address on the pins.
    fn address(&mut self, mode: AddressingMode, access: Access) {
        match (mode, self.step) {
            (_, 0) => {
                let pc = self.next_pc();
                self.set_address(pc);
            }
            (ZeroPage, 1) => self.set_address(u16::from(self.data())),
            (ZeroPageX | ZeroPageY | IndirectX | IndirectY, 1) => {
                self.ad = u16::from(self.data());
                self.set_address(self.ad);
            }
            (ZeroPageX, 2) => self.set_address((self.ad + u16::from(self.regs.x)) & 0x00FF),
            (ZeroPageY, 2) => self.set_address((self.ad + u16::from(self.regs.y)) & 0x00FF),
            (Absolute | AbsoluteX | AbsoluteY, 1) => {
                let pc = self.next_pc();
                self.set_address(pc);
                self.ad = u16::from(self.data());
            }
            (Absolute, 2) => self.set_address((u16::from(self.data()) << 8) | self.ad),
            (AbsoluteX, 2) => {
                self.ad |= u16::from(self.data()) << 8;
                self.index_fixup(self.regs.x, access);
            }
            (AbsoluteY, 2) => {
                self.ad |= u16::from(self.data()) << 8;
                self.index_fixup(self.regs.y, access);
            }
            (AbsoluteX, 3) => self.set_address(self.ad.wrapping_add(u16::from(self.regs.x))),
            (AbsoluteY, 3) | (IndirectY, 4) => {
                self.set_address(self.ad.wrapping_add(u16::from(self.regs.y)));
            }
            (IndirectX, 2) => {
                self.ad = (self.ad + u16::from(self.regs.x)) & 0x00FF;
                self.set_address(self.ad);
            }
            (IndirectX, 3) | (IndirectY, 2) => {
                self.set_address((self.ad + 1) & 0x00FF);
                self.ad = u16::from(self.data());
            }
            (IndirectX, 4) => self.set_address((u16::from(self.data()) << 8) | self.ad),
            (IndirectY, 3) => {
                self.ad |= u16::from(self.data()) << 8;
                self.index_fixup(self.regs.y, access);
            }
            _ => self.invalid_step(),
        }
    }

    /// Put the base address with only the low byte indexed on the bus. Reads
    /// that did not cross a page are already done and skip the next step.
    fn index_fixup(&mut self, index: u8, access: Access) {
        let target = self.ad.wrapping_add(u16::from(index));
        self.set_address((self.ad & 0xFF00) | (target & 0x00FF));
        if access == Access::Read && target & 0xFF00 == self.ad & 0xFF00 {
            self.step += 1;
        }
    }

    // === Instruction shapes ===

    fn implied(&mut self, op: fn(&mut Self)) {
        match self.step {
            0 => self.set_address(self.regs.pc),
            1 => {
                op(self);
                self.fetch();
            }
            _ => self.invalid_step(),
        }
    }

    fn modify_accumulator(&mut self, op: ModifyOp) {
        match self.step {
            0 => self.set_address(self.regs.pc),
            1 => {
                let a = self.regs.a;
                let result = op(self, a);
                self.set_a(result);
                self.fetch();
            }
            _ => self.invalid_step(),
        }
    }

    fn read_op(&mut self, mode: AddressingMode, op: ReadOp) {
        let last = mode.address_steps();
        if self.step < last {
            self.address(mode, Access::Read);
        } else if self.step == last {
            let value = self.data();
            op(self, value);
            self.fetch();
        } else {
            self.invalid_step();
        }
    }

    fn write_op(&mut self, mode: AddressingMode, value: StoreValue) {
        let last = mode.address_steps();
        if self.step < last {
            self.address(mode, Access::Write);
            if self.step + 1 == last {
                let stored = value(self);
                self.write_here(stored);
            }
        } else if self.step == last {
            self.fetch();
        } else {
            self.invalid_step();
        }
    }

    /// Read, write the unmodified value back, then write the result.
    fn modify_op(&mut self, mode: AddressingMode, op: ModifyOp) {
        let last = mode.address_steps();
        match self.step {
            step if step < last => self.address(mode, Access::Modify),
            step if step == last => {
                let value = self.data();
                self.ad = u16::from(value);
                self.write_here(value);
            }
            step if step == last + 1 => {
                let value = self.ad as u8;
                let result = op(self, value);
                self.write_here(result);
            }
            step if step == last + 2 => self.fetch(),
            _ => self.invalid_step(),
        }
    }

    /// SHA, SHX, SHY and TAS. The stored value is ANDed with the base high
    /// byte plus one, and a page cross replaces the high address byte with
    /// that value.
    fn unstable_store(&mut self, mode: AddressingMode, value: StoreValue) {
        let last = mode.address_steps();
        if self.step < last {
            self.address(mode, Access::Write);
            if self.step + 1 == last {
                let index = if mode == AbsoluteX { self.regs.x } else { self.regs.y };
                let target = self.ad.wrapping_add(u16::from(index));
                let stored = value(self) & ((self.ad >> 8) as u8).wrapping_add(1);
                let address = if target & 0xFF00 == self.ad & 0xFF00 {
                    target
                } else {
                    (u16::from(stored) << 8) | (target & 0x00FF)
                };
                self.write(address, stored);
            }
        } else if self.step == last {
            self.fetch();
        } else {
            self.invalid_step();
        }
    }

    fn branch(&mut self, taken: bool) {
        match self.step {
            0 => {
                let pc = self.next_pc();
                self.set_address(pc);
            }
            1 => {
                self.set_address(self.regs.pc);
                self.ad = self.regs.pc.wrapping_add(self.data() as i8 as u16);
                if !taken {
                    self.fetch();
                }
            }
            2 => {
                self.set_address((self.regs.pc & 0xFF00) | (self.ad & 0x00FF));
                if self.ad & 0xFF00 == self.regs.pc & 0xFF00 {
                    // Taken without a page cross: interrupts sampled during
                    // this instruction wait one more instruction.
                    self.regs.pc = self.ad;
                    self.irq_latch.unshift();
                    self.nmi_latch.unshift();
                    self.fetch();
                }
            }
            3 => {
                self.regs.pc = self.ad;
                self.fetch();
            }
            _ => self.invalid_step(),
        }
    }

    fn jam(&mut self) {
        match self.step {
            0 => self.set_address(self.regs.pc),
            1 => {
                if !self.jammed {
                    warn!("JAM {:02X} at PC={:04X}", self.ir, self.regs.pc.wrapping_sub(1));
                    self.jammed = true;
                }
                self.set_address(0xFFFF);
                self.step -= 1;
            }
            _ => self.invalid_step(),
        }
    }

    // === Stack and flow ===

    fn stack_address(&self) -> u16 {
        0x0100 | u16::from(self.sp)
    }

    /// Write `value` at S and decrement it. The reset sequence reads instead.
    fn push(&mut self, value: u8) {
        let address = self.stack_address();
        self.sp = self.sp.wrapping_sub(1);
        self.set_s(self.sp);
        if self.hijack == Hijack::Reset {
            self.set_address(address);
        } else {
            self.write(address, value);
        }
    }

    /// Read at S and increment it.
    fn pull(&mut self) {
        self.set_address(self.stack_address());
        self.sp = self.sp.wrapping_add(1);
        self.set_s(self.sp);
    }

    /// BRK, and the forced BRK used for IRQ, NMI and reset.
    fn brk(&mut self) {
        match self.step {
            0 => {
                self.sp = self.regs.s;
                self.set_address(self.regs.pc);
            }
            1 => {
                if !self.hijack.is_hardware() {
                    self.regs.pc = self.regs.pc.wrapping_add(1);
                }
                self.push((self.regs.pc >> 8) as u8);
            }
            2 => self.push(self.regs.pc as u8),
            3 => {
                self.push(self.regs.p.to_byte(self.hijack == Hijack::None));
                self.ad = self.vector();
            }
            4 => {
                self.set_address(self.ad);
                self.ad = self.ad.wrapping_add(1);
                self.regs.p.set(I);
                self.hijack = Hijack::None;
            }
            5 => {
                self.set_address(self.ad);
                self.ad = u16::from(self.data());
            }
            6 => {
                self.regs.pc = (u16::from(self.data()) << 8) | self.ad;
                self.fetch();
            }
            _ => self.invalid_step(),
        }
    }

    /// Vector for the running BRK sequence. An NMI that arrives while a BRK
    /// or IRQ is pushing takes over its vector fetch.
    fn vector(&mut self) -> u16 {
        match self.hijack {
            Hijack::Reset => 0xFFFC,
            Hijack::Nmi => 0xFFFA,
            Hijack::Irq | Hijack::None => {
                if self.nmi_latch.is_recognised(NMI_RECOGNISED) {
                    trace!("NMI hijacks {:?} vector fetch", self.hijack);
                    self.nmi_latch.clear();
                    0xFFFA
                } else {
                    0xFFFE
                }
            }
        }
    }

    fn jsr(&mut self) {
        match self.step {
            0 => {
                self.sp = self.regs.s;
                let pc = self.next_pc();
                self.set_address(pc);
            }
            1 => {
                self.set_address(self.stack_address());
                self.ad = u16::from(self.data());
            }
            2 => self.push((self.regs.pc >> 8) as u8),
            3 => self.push(self.regs.pc as u8),
            4 => self.set_address(self.regs.pc),
            5 => {
                self.regs.pc = (u16::from(self.data()) << 8) | self.ad;
                self.fetch();
            }
            _ => self.invalid_step(),
        }
    }

    fn rts(&mut self) {
        match self.step {
            0 => {
                self.sp = self.regs.s;
                self.set_address(self.regs.pc);
            }
            1 | 2 => self.pull(),
            3 => {
                self.set_address(self.stack_address());
                self.regs.pc = u16::from(self.data());
            }
            4 => {
                self.regs.pc |= u16::from(self.data()) << 8;
                let pc = self.next_pc();
                self.set_address(pc);
            }
            5 => self.fetch(),
            _ => self.invalid_step(),
        }
    }

    fn rti(&mut self) {
        match self.step {
            0 => {
                self.sp = self.regs.s;
                self.set_address(self.regs.pc);
            }
            1 | 2 => self.pull(),
            3 => {
                self.pull();
                self.regs.p = Status::from_byte(self.data());
            }
            4 => {
                self.set_address(self.stack_address());
                self.ad = u16::from(self.data());
            }
            5 => {
                self.regs.pc = (u16::from(self.data()) << 8) | self.ad;
                self.fetch();
            }
            _ => self.invalid_step(),
        }
    }

    fn pha(&mut self) {
        match self.step {
            0 => {
                self.sp = self.regs.s;
                self.set_address(self.regs.pc);
            }
            1 => self.push(self.regs.a),
            2 => self.fetch(),
            _ => self.invalid_step(),
        }
    }

    fn php(&mut self) {
        match self.step {
            0 => {
                self.sp = self.regs.s;
                self.set_address(self.regs.pc);
            }
            1 => self.push(self.regs.p.to_byte(true)),
            2 => self.fetch(),
            _ => self.invalid_step(),
        }
    }

    fn pla(&mut self) {
        match self.step {
            0 => {
                self.sp = self.regs.s;
                self.set_address(self.regs.pc);
            }
            1 => self.pull(),
            2 => self.set_address(self.stack_address()),
            3 => {
                self.load_a(self.data());
                self.fetch();
            }
            _ => self.invalid_step(),
        }
    }

    fn plp(&mut self) {
        match self.step {
            0 => {
                self.sp = self.regs.s;
                self.set_address(self.regs.pc);
            }
            1 => self.pull(),
            2 => self.set_address(self.stack_address()),
            3 => {
                self.regs.p = Status::from_byte(self.data());
                self.fetch();
            }
            _ => self.invalid_step(),
        }
    }

    fn jmp_absolute(&mut self) {
        match self.step {
            0 => {
                let pc = self.next_pc();
                self.set_address(pc);
            }
            1 => {
                let pc = self.next_pc();
                self.set_address(pc);
                self.ad = u16::from(self.data());
            }
            2 => {
                self.regs.pc = (u16::from(self.data()) << 8) | self.ad;
                self.fetch();
            }
            _ => self.invalid_step(),
        }
    }

    /// The pointer's high byte is read without carrying into the page, so
    /// `JMP ($10FF)` takes its high byte from $1000.
    fn jmp_indirect(&mut self) {
        match self.step {
            0 => {
                let pc = self.next_pc();
                self.set_address(pc);
            }
            1 => {
                let pc = self.next_pc();
                self.set_address(pc);
                self.ad = u16::from(self.data());
            }
            2 => {
                self.ad |= u16::from(self.data()) << 8;
                self.set_address(self.ad);
            }
            3 => {
                self.set_address((self.ad & 0xFF00) | (self.ad.wrapping_add(1) & 0x00FF));
                self.ad = u16::from(self.data());
            }
            4 => {
                self.regs.pc = (u16::from(self.data()) << 8) | self.ad;
                self.fetch();
            }
            _ => self.invalid_step(),
        }
    }

    // === Operations ===

    fn nop_read(&mut self, _value: u8) {}

    fn load_a(&mut self, value: u8) {
        self.set_a(value);
        self.regs.p.update_nz(value);
    }

    fn load_x(&mut self, value: u8) {
        self.set_x(value);
        self.regs.p.update_nz(value);
    }

    fn load_y(&mut self, value: u8) {
        self.set_y(value);
        self.regs.p.update_nz(value);
    }

    fn lax(&mut self, value: u8) {
        self.load_a(value);
        self.set_x(value);
    }

    fn ora(&mut self, value: u8) {
        self.load_a(self.regs.a | value);
    }

    fn and(&mut self, value: u8) {
        self.load_a(self.regs.a & value);
    }

    fn eor(&mut self, value: u8) {
        self.load_a(self.regs.a ^ value);
    }

    fn adc(&mut self, value: u8) {
        let decimal = self.decimal_enabled();
        let result = alu::adc(&mut self.regs.p, self.regs.a, value, decimal);
        self.set_a(result);
    }

    fn sbc(&mut self, value: u8) {
        let decimal = self.decimal_enabled();
        let result = alu::sbc(&mut self.regs.p, self.regs.a, value, decimal);
        self.set_a(result);
    }

    fn cmp(&mut self, value: u8) {
        alu::compare(&mut self.regs.p, self.regs.a, value);
    }

    fn cpx(&mut self, value: u8) {
        alu::compare(&mut self.regs.p, self.regs.x, value);
    }

    fn cpy(&mut self, value: u8) {
        alu::compare(&mut self.regs.p, self.regs.y, value);
    }

    fn bit(&mut self, value: u8) {
        alu::bit(&mut self.regs.p, self.regs.a, value);
    }

    fn asl(&mut self, value: u8) -> u8 {
        alu::asl(&mut self.regs.p, value)
    }

    fn lsr(&mut self, value: u8) -> u8 {
        alu::lsr(&mut self.regs.p, value)
    }

    fn rol(&mut self, value: u8) -> u8 {
        alu::rol(&mut self.regs.p, value)
    }

    fn ror(&mut self, value: u8) -> u8 {
        alu::ror(&mut self.regs.p, value)
    }

    fn inc(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.regs.p.update_nz(result);
        result
    }

    fn dec(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.regs.p.update_nz(result);
        result
    }

    // Undocumented combinations of the above.

    fn slo(&mut self, value: u8) -> u8 {
        let result = self.asl(value);
        self.ora(result);
        result
    }

    fn rla(&mut self, value: u8) -> u8 {
        let result = self.rol(value);
        self.and(result);
        result
    }

    fn sre(&mut self, value: u8) -> u8 {
        let result = self.lsr(value);
        self.eor(result);
        result
    }

    fn rra(&mut self, value: u8) -> u8 {
        let result = self.ror(value);
        self.adc(result);
        result
    }

    fn dcp(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.cmp(result);
        result
    }

    fn isb(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.sbc(result);
        result
    }

    fn anc(&mut self, value: u8) {
        self.and(value);
        let negative = self.regs.p.is_set(N);
        self.regs.p.set_if(C, negative);
    }

    fn alr(&mut self, value: u8) {
        let result = alu::lsr(&mut self.regs.p, self.regs.a & value);
        self.set_a(result);
    }

    fn arr(&mut self, value: u8) {
        let decimal = self.decimal_enabled();
        let result = alu::arr(&mut self.regs.p, self.regs.a & value, decimal);
        self.set_a(result);
    }

    /// ANE and LXA mix in an analogue "magic" constant; $EE is the value
    /// most NMOS parts show.
    fn ane(&mut self, value: u8) {
        self.load_a((self.regs.a | 0xEE) & self.regs.x & value);
    }

    fn lxa(&mut self, value: u8) {
        self.lax((self.regs.a | 0xEE) & value);
    }

    fn sbx(&mut self, value: u8) {
        let result = alu::sbx(&mut self.regs.p, self.regs.a, self.regs.x, value);
        self.set_x(result);
    }

    fn las(&mut self, value: u8) {
        let result = value & self.regs.s;
        self.lax(result);
        self.set_s(result);
    }
}
