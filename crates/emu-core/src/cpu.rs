//! CPU core trait.

/// A CPU core.
///
/// Pin-level CPUs are clocked by their owner and never touch memory
/// themselves, so this trait only covers inspection. Clocking and bus
/// servicing live on the concrete types because their shape is
/// chip-specific (phase inputs, dividers, stall lines).
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU has stopped executing (e.g. a JAM opcode).
    fn is_halted(&self) -> bool;
}
