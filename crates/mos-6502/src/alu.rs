//! Arithmetic and logic shared by the microcode.
//!
//! Everything here is a pure function of its inputs plus the status flags it
//! updates. Register write-back is the caller's job.

use crate::flags::{C, D, N, V, Z};
use crate::Status;

/// ADC. Decimal mode follows NMOS behaviour: N and V come from the
/// intermediate result, Z from the binary sum.
pub fn adc(p: &mut Status, a: u8, value: u8, decimal_enabled: bool) -> u8 {
    let carry = u16::from(p.is_set(C));
    let binary = u16::from(a) + u16::from(value) + carry;

    if decimal_enabled && p.is_set(D) {
        let mut lo = u16::from(a & 0x0F) + u16::from(value & 0x0F) + carry;
        if lo >= 0x0A {
            lo = ((lo + 0x06) & 0x0F) + 0x10;
        }
        let mut sum = u16::from(a & 0xF0) + u16::from(value & 0xF0) + lo;
        let signed = i16::from((a & 0xF0) as i8) + i16::from((value & 0xF0) as i8) + lo as i16;

        p.set_if(Z, binary & 0xFF == 0);
        p.set_if(N, sum & 0x80 != 0);
        p.set_if(V, !(-128..=127).contains(&signed));
        if sum >= 0xA0 {
            sum += 0x60;
        }
        p.set_if(C, sum >= 0x100);
        sum as u8
    } else {
        let result = binary as u8;
        p.set_if(C, binary > 0xFF);
        p.set_if(V, (!(a ^ value) & (a ^ result) & 0x80) != 0);
        p.update_nz(result);
        result
    }
}

/// SBC. In decimal mode the flags still come from the binary difference.
pub fn sbc(p: &mut Status, a: u8, value: u8, decimal_enabled: bool) -> u8 {
    let borrow = i16::from(!p.is_set(C));
    let binary = i16::from(a) - i16::from(value) - borrow;
    let result = binary as u8;

    let decimal = decimal_enabled && p.is_set(D);
    p.set_if(C, binary >= 0);
    p.set_if(V, ((a ^ value) & (a ^ result) & 0x80) != 0);
    p.update_nz(result);

    if !decimal {
        return result;
    }
    let mut lo = i16::from(a & 0x0F) - i16::from(value & 0x0F) - borrow;
    if lo < 0 {
        lo = ((lo - 0x06) & 0x0F) - 0x10;
    }
    let mut diff = i16::from(a & 0xF0) - i16::from(value & 0xF0) + lo;
    if diff < 0 {
        diff -= 0x60;
    }
    diff as u8
}

/// CMP/CPX/CPY.
pub fn compare(p: &mut Status, register: u8, value: u8) {
    p.set_if(C, register >= value);
    p.update_nz(register.wrapping_sub(value));
}

pub fn bit(p: &mut Status, a: u8, value: u8) {
    p.set_if(Z, a & value == 0);
    p.set_if(N, value & 0x80 != 0);
    p.set_if(V, value & 0x40 != 0);
}

pub fn asl(p: &mut Status, value: u8) -> u8 {
    p.set_if(C, value & 0x80 != 0);
    let result = value << 1;
    p.update_nz(result);
    result
}

pub fn lsr(p: &mut Status, value: u8) -> u8 {
    p.set_if(C, value & 0x01 != 0);
    let result = value >> 1;
    p.update_nz(result);
    result
}

pub fn rol(p: &mut Status, value: u8) -> u8 {
    let result = (value << 1) | u8::from(p.is_set(C));
    p.set_if(C, value & 0x80 != 0);
    p.update_nz(result);
    result
}

pub fn ror(p: &mut Status, value: u8) -> u8 {
    let result = (value >> 1) | (u8::from(p.is_set(C)) << 7);
    p.set_if(C, value & 0x01 != 0);
    p.update_nz(result);
    result
}

/// ARR: the AND has already been applied to `value`. The rotate goes through
/// the adder, so decimal mode applies a BCD fix-up.
pub fn arr(p: &mut Status, value: u8, decimal_enabled: bool) -> u8 {
    let carry = p.is_set(C);
    let mut result = (value >> 1) | (u8::from(carry) << 7);
    p.update_nz(result);
    p.clear(V | C);

    if decimal_enabled && p.is_set(D) {
        if (result ^ value) & 0x40 != 0 {
            p.set(V);
        }
        if value & 0x0F >= 0x05 {
            result = (result.wrapping_add(0x06) & 0x0F) | (result & 0xF0);
        }
        if value & 0xF0 >= 0x50 {
            result = result.wrapping_add(0x60);
            p.set(C);
        }
    } else {
        if result & 0x40 != 0 {
            p.set(V | C);
        }
        if result & 0x20 != 0 {
            p.set_if(V, !p.is_set(V));
        }
    }
    result
}

/// SBX: X = (A AND X) - value, without borrow-in and without touching V.
pub fn sbx(p: &mut Status, a: u8, x: u8, value: u8) -> u8 {
    let masked = a & x;
    p.set_if(C, masked >= value);
    let result = masked.wrapping_sub(value);
    p.update_nz(result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(flags: u8) -> Status {
        let mut p = Status::new();
        p.set(flags);
        p
    }

    #[test]
    fn adc_binary_overflow() {
        let mut p = Status::new();
        assert_eq!(adc(&mut p, 0x7F, 0x01, true), 0x80);
        assert!(p.is_set(V) && p.is_set(N) && !p.is_set(C));

        let mut p = status(C);
        assert_eq!(adc(&mut p, 0xFF, 0x00, true), 0x00);
        assert!(p.is_set(C) && p.is_set(Z) && !p.is_set(V));
    }

    #[test]
    fn adc_decimal() {
        let mut p = status(D);
        assert_eq!(adc(&mut p, 0x09, 0x01, true), 0x10);
        assert!(!p.is_set(C));

        let mut p = status(D);
        assert_eq!(adc(&mut p, 0x99, 0x01, true), 0x00);
        assert!(p.is_set(C));
        // Z reflects the binary sum $9A.
        assert!(!p.is_set(Z));
        assert!(p.is_set(N));
    }

    #[test]
    fn adc_ignores_d_when_decimal_disabled() {
        let mut p = status(D);
        assert_eq!(adc(&mut p, 0x09, 0x01, false), 0x0A);
    }

    #[test]
    fn sbc_binary() {
        let mut p = status(C);
        assert_eq!(sbc(&mut p, 0x00, 0x01, true), 0xFF);
        assert!(!p.is_set(C) && p.is_set(N));

        let mut p = status(C);
        assert_eq!(sbc(&mut p, 0x80, 0x01, true), 0x7F);
        assert!(p.is_set(V) && p.is_set(C));
    }

    #[test]
    fn sbc_decimal() {
        let mut p = status(D | C);
        assert_eq!(sbc(&mut p, 0x10, 0x01, true), 0x09);
        assert!(p.is_set(C));

        let mut p = status(D | C);
        assert_eq!(sbc(&mut p, 0x00, 0x01, true), 0x99);
        assert!(!p.is_set(C));
    }

    #[test]
    fn rotates_go_through_carry() {
        let mut p = status(C);
        assert_eq!(rol(&mut p, 0x80), 0x01);
        assert!(p.is_set(C));
        assert_eq!(ror(&mut p, 0x00), 0x80);
        assert!(!p.is_set(C) && p.is_set(N));
    }

    #[test]
    fn compare_sets_carry_on_greater_or_equal() {
        let mut p = Status::new();
        compare(&mut p, 0x40, 0x40);
        assert!(p.is_set(C) && p.is_set(Z));
        compare(&mut p, 0x3F, 0x40);
        assert!(!p.is_set(C) && p.is_set(N));
    }

    #[test]
    fn arr_binary_flags() {
        let mut p = status(C);
        // $C0 >> 1 with carry in = $E0: bit 6 set, bit 5 set.
        assert_eq!(arr(&mut p, 0xC0, true), 0xE0);
        assert!(p.is_set(C) && !p.is_set(V) && p.is_set(N));
    }

    #[test]
    fn sbx_masks_then_subtracts() {
        let mut p = Status::new();
        assert_eq!(sbx(&mut p, 0xF0, 0x3C, 0x10), 0x20);
        assert!(p.is_set(C));
        assert_eq!(sbx(&mut p, 0x0F, 0x0F, 0x10), 0xFF);
        assert!(!p.is_set(C));
    }
}
