//! Pin-level, cycle-exact NMOS 6502.
//!
//! The chip is driven the way the silicon is: the owner toggles the Ø0 clock
//! input, drives RES/IRQ/NMI/RDY, and services the address and data pins
//! after every edge. One microcode step runs per falling edge; writes reach
//! the data pins on the rising edge.
//!
//! ```
//! use emu_core::SimpleBus;
//! use mos_6502::{Mos6502, Options};
//!
//! let mut bus = SimpleBus::new();
//! bus.load(0x0400, &[0xA9, 0x42, 0x85, 0x10]); // LDA #$42 ; STA $10
//! bus.poke_word(0xFFFC, 0x0400);
//!
//! let mut cpu = Mos6502::new(Options::default());
//! for _ in 0..20 {
//!     cpu.tick();
//!     cpu.service(&mut bus);
//! }
//! assert_eq!(bus.peek(0x0010), 0x42);
//! ```

mod alu;
mod config;
mod cpu;
mod disasm;
pub mod flags;
mod interrupts;
mod microcode;
mod opcodes;
mod pins;
mod registers;

pub use config::{CompatibilityMode, ConfigError, Options};
pub use cpu::Mos6502;
pub use disasm::{DecodedInstruction, disassemble};
pub use flags::Status;
pub use interrupts::Hijack;
pub use opcodes::{AddressingMode, OPCODES, Opcode};
pub use pins::Pins;
pub use registers::Registers;
