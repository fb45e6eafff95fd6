pub mod assign; // Patch binning and instrument construction
pub mod bend; // Pitch-bend and modulation smoothing
pub mod collector; // Cursor-based event and arc iteration
pub mod instrument;
pub mod midi; // Event model, tempo map, note arcs
pub mod stage;
pub mod util;
pub mod visibility;

/// Number of channels in a standard MIDI stream.
pub const CHANNEL_COUNT: usize = 16;

/// The channel reserved for rhythmic (percussion) events.
pub const PERCUSSION_CHANNEL: u8 = 9;
