//! Interrupt recognition.
//!
//! IRQ and NMI are sampled on every low phase into shift registers. Bit 0 is
//! set when the line was seen active this phase; the whole register moves up
//! one bit at the end of each executed cycle. At an opcode fetch the bits
//! tell how long ago the line went active, which is what decides whether the
//! interrupt is taken before the next instruction.

/// Which forced-BRK sequence runs instead of the next opcode.
///
/// Ordered by priority so a pending request can only be upgraded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Hijack {
    #[default]
    None,
    Irq,
    Nmi,
    Reset,
}

impl Hijack {
    /// Fold newly recognised interrupts into the pending request.
    #[must_use]
    pub fn resolve(self, irq: bool, nmi: bool) -> Self {
        let mut hijack = self;
        if irq {
            hijack = hijack.max(Hijack::Irq);
        }
        if nmi {
            hijack = hijack.max(Hijack::Nmi);
        }
        hijack
    }

    /// IRQ and NMI push the address of the interrupted instruction instead of
    /// skipping a signature byte like BRK.
    #[must_use]
    pub const fn is_hardware(self) -> bool {
        matches!(self, Hijack::Irq | Hijack::Nmi)
    }
}

/// IRQ must have been sampled two cycles before the fetch.
pub const IRQ_RECOGNISED: u16 = 0b100;

/// An NMI edge counts once it is at least two cycles old.
pub const NMI_RECOGNISED: u16 = 0xFFFC;

/// Shift register of interrupt samples.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InterruptLatch(u16);

impl InterruptLatch {
    /// Record that the line is active this phase.
    pub fn sample(&mut self) {
        self.0 |= 1;
    }

    /// Age every sample by one cycle.
    pub fn shift(&mut self) {
        self.0 <<= 1;
    }

    /// Undo one cycle of ageing. Used by taken branches that stay on the
    /// same page, which delays interrupt recognition by one instruction.
    ///
    /// The sample taken this cycle stays in bit 0. An NMI edge is only seen
    /// once, so it must survive being folded into the previous cycle's bit.
    pub fn unshift(&mut self) {
        self.0 = (self.0 >> 1) | (self.0 & 1);
    }

    /// True if any sample selected by `mask` is present.
    #[must_use]
    pub const fn is_recognised(self, mask: u16) -> bool {
        self.0 & mask != 0
    }

    /// Drop samples old enough to have been acted on, keeping the two most
    /// recent so they can still be recognised at the next fetch.
    pub fn truncate(&mut self) {
        self.0 &= 0b11;
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hijack_priority() {
        assert_eq!(Hijack::None.resolve(true, false), Hijack::Irq);
        assert_eq!(Hijack::None.resolve(true, true), Hijack::Nmi);
        assert_eq!(Hijack::Reset.resolve(true, true), Hijack::Reset);
        assert_eq!(Hijack::Nmi.resolve(true, false), Hijack::Nmi);
        assert!(!Hijack::Reset.is_hardware());
    }

    #[test]
    fn irq_needs_two_shifts() {
        let mut latch = InterruptLatch::default();
        latch.sample();
        latch.shift();
        assert!(!latch.is_recognised(IRQ_RECOGNISED));
        latch.shift();
        assert!(latch.is_recognised(IRQ_RECOGNISED));
    }

    #[test]
    fn unshift_keeps_the_newest_sample() {
        let mut latch = InterruptLatch::default();
        latch.sample();
        latch.unshift();
        assert_eq!(latch.bits(), 0b1);

        latch.shift();
        latch.shift();
        latch.unshift();
        assert_eq!(latch.bits(), 0b10);
        assert!(!latch.is_recognised(NMI_RECOGNISED));
        latch.shift();
        assert!(latch.is_recognised(NMI_RECOGNISED));
    }

    #[test]
    fn truncate_keeps_recent_samples() {
        let mut latch = InterruptLatch::default();
        latch.sample();
        latch.shift();
        latch.shift();
        latch.sample();
        latch.truncate();
        assert_eq!(latch.bits(), 0b01);
        assert!(!latch.is_recognised(NMI_RECOGNISED));
    }
}
