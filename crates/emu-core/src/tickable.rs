//! Trait for components that can be advanced by clock ticks.

/// A component that can be advanced by clock ticks.
///
/// A tick is one edge of the component's input clock. Dividers and phase
/// generators count these edges and drive slower internal clocks from them.
pub trait Tickable {
    /// Advance the component by one input clock edge.
    fn tick(&mut self);

    /// Advance the component by `count` edges.
    ///
    /// Must produce the same state as calling `tick()` `count` times.
    fn tick_n(&mut self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }
}
