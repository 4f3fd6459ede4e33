//! OAM DMA halting the core.

use emu_core::{Cpu, SimpleBus, Tickable};
use ricoh_2a03::{DmaState, EDGES_PER_PHASE, Ricoh2A03};

const START: u16 = 0x8000;
const EDGES_PER_CYCLE: u64 = 2 * EDGES_PER_PHASE as u64;

struct Machine {
    chip: Ricoh2A03,
    bus: SimpleBus,
}

impl Machine {
    fn new(program: &[u8]) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut bus = SimpleBus::new();
        bus.load(START, program);
        bus.poke_word(0xFFFC, START);

        let mut machine = Self {
            chip: Ricoh2A03::new(),
            bus,
        };
        machine.chip.tick_n(u64::from(EDGES_PER_PHASE));
        machine.chip.service(&mut machine.bus);

        machine.chip.set_reset(false);
        machine.cycle();
        machine.cycle();
        machine.chip.set_reset(true);
        for _ in 0..20 {
            machine.cycle();
            if machine.chip.core().is_fetching() && machine.chip.pins().address == START {
                return machine;
            }
        }
        panic!("reset did not reach ${START:04X}");
    }

    fn cycle(&mut self) {
        self.chip.tick_n(EDGES_PER_CYCLE);
        self.chip.service(&mut self.bus);
    }

    /// Run `cycles` CPU cycles, returning how many of them the core sat out.
    fn count_stalls(&mut self, cycles: usize) -> u16 {
        let mut stalled = 0;
        for _ in 0..cycles {
            self.cycle();
            if self.chip.core().is_stalled() {
                stalled += 1;
            }
        }
        stalled
    }
}

/// Optional padding, then LDA #$02 ; STA $4014 ; INC $10 ; JMP back to INC.
fn dma_program(padding: &[u8]) -> Vec<u8> {
    let mut program = padding.to_vec();
    program.extend_from_slice(&[0xA9, 0x02, 0x8D, 0x14, 0x40]);
    let inc = START + program.len() as u16;
    program.extend_from_slice(&[0xE6, 0x10, 0x4C, inc as u8, (inc >> 8) as u8]);
    program
}

#[test]
fn write_to_4014_steals_513_or_514_cycles() {
    let mut m = Machine::new(&dma_program(&[]));
    let stalled = m.count_stalls(1500);

    assert!(stalled == 513 || stalled == 514, "stalled {stalled} cycles");
    assert_eq!(stalled, m.chip.dma().stolen());
    assert_eq!(m.chip.dma().page(), 0x02);
    assert_eq!(m.chip.dma().state(), DmaState::Idle);
    assert!(!m.chip.pins().rdy);
    assert!(m.bus.peek(0x0010) > 0, "program resumed after DMA");
}

#[test]
fn start_parity_decides_the_extra_cycle() {
    // LDA $00 takes three cycles, which moves the halt to the other parity.
    let mut even = Machine::new(&dma_program(&[]));
    let mut odd = Machine::new(&dma_program(&[0xA5, 0x00]));
    let mut counts = [even.count_stalls(1500), odd.count_stalls(1500)];
    counts.sort_unstable();
    assert_eq!(counts, [513, 514]);
}

#[test]
fn halted_core_repeats_the_same_read() {
    let mut m = Machine::new(&dma_program(&[]));

    // Run up to the first stolen cycle.
    let mut guard = 0;
    while !m.chip.core().is_stalled() {
        m.cycle();
        guard += 1;
        assert!(guard < 20, "DMA never halted the core");
    }

    let frozen = *m.chip.pins();
    assert_eq!(frozen.address, START + 5, "halted on the INC opcode fetch");
    let pc = m.chip.core().registers().pc;
    for _ in 0..100 {
        m.cycle();
        assert!(m.chip.core().is_stalled());
        assert_eq!(m.chip.pins().address, frozen.address);
        assert!(m.chip.pins().rw);
        assert_eq!(m.chip.core().registers().pc, pc);
    }
    assert_eq!(m.bus.peek(0x0010), 0);
}

#[test]
fn writes_elsewhere_do_not_start_dma() {
    let mut m = Machine::new(&[
        0xA9, 0x02, // LDA #$02
        0x8D, 0x15, 0x40, // STA $4015
        0xE6, 0x10, // INC $10
        0x4C, 0x05, 0x80, // JMP $8005
    ]);
    assert_eq!(m.count_stalls(200), 0);
    assert!(!m.chip.dma().is_halting());
    assert!(m.bus.peek(0x0010) > 0);
}
