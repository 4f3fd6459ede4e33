//! Core traits for pin-level, cycle-exact emulation.
//!
//! Chips here are driven by clock edges from the outside. A chip never
//! reaches into memory on its own: after each edge the owner inspects the
//! pins and services the bus transaction they describe.

mod bus;
mod cpu;
mod observable;
mod tickable;

pub use bus::{Bus, SimpleBus};
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use tickable::Tickable;
