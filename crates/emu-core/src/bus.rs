//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// Pin-level chips put an address and a direction on their pins; whoever owns
/// the chip completes the transaction through this trait.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// Flat 64 KiB of RAM with no decoding or side effects.
///
/// Enough for functional test images that expect RAM everywhere.
#[derive(Clone)]
pub struct SimpleBus {
    memory: Vec<u8>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x1_0000],
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.memory[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Read without going through the bus.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    /// Write without going through the bus.
    pub fn poke(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address)] = value;
    }

    /// Little-endian word at `address`.
    #[must_use]
    pub fn peek_word(&self, address: u16) -> u16 {
        u16::from_le_bytes([self.peek(address), self.peek(address.wrapping_add(1))])
    }

    /// Store a little-endian word, e.g. to patch an interrupt vector.
    pub fn poke_word(&mut self, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.poke(address, lo);
        self.poke(address.wrapping_add(1), hi);
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.poke(address, value);
    }
}
