pub mod arc;
pub mod event;

pub use arc::TimedArcCollector;
pub use event::EventCollector;

use crate::midi::MidiEvent;

/// Anything that occurs at an absolute MIDI tick.
///
/// Collectors precompute each item's wall-clock time from the tempo map at
/// construction, so the hot advance path never converts ticks.
pub trait Ticked {
    fn tick(&self) -> u64;
}

impl Ticked for MidiEvent {
    fn tick(&self) -> u64 {
        MidiEvent::tick(self)
    }
}

impl Ticked for crate::midi::virt::CompositeBendEvent {
    fn tick(&self) -> u64 {
        self.tick
    }
}

impl Ticked for crate::midi::virt::ModulationDepthRangeEvent {
    fn tick(&self) -> u64 {
        self.tick
    }
}
