pub mod arc;
pub mod event;
pub mod load;
pub mod tempo;
pub mod virt;

pub use arc::{build_arcs, contiguous_groups, ArcGroup, TimedArc};
pub use event::MidiEvent;
pub use load::{load_sequence, LoadError, Sequence};
pub use tempo::TempoMap;
