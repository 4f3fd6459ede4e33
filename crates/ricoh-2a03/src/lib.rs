//! Ricoh 2A03, the NES CPU.
//!
//! A MOS 6502 core without decimal mode, clocked by a divide-by-12 counter
//! on the master clock. The package also carries the OAM DMA unit, which
//! halts the core through RDY while sprite data is copied.
//!
//! Drive it with [`Tickable::tick`](emu_core::Tickable::tick), one master
//! clock edge per call, and service the bus whenever the core's Ø2 goes
//! high.

mod chip;
mod dma;

pub use chip::{EDGES_PER_PHASE, M2_RISE_EDGE, OAM_DMA, Ricoh2A03};
pub use dma::{CycleSteal, DmaState};
