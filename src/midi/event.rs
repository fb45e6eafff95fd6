//! Channel-scoped MIDI events.
//!
//! Events are parsed once from the source file and are immutable thereafter.
//! Ticks are absolute (not delta) and non-negative; every per-channel list in
//! this crate is kept sorted by tick.

/// A channel-scoped MIDI event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MidiEvent {
    /// A note begins sounding.
    NoteOn {
        tick: u64,
        channel: u8,
        note: u8,
        velocity: u8,
    },
    /// A note stops sounding.
    NoteOff { tick: u64, channel: u8, note: u8 },
    /// The channel's patch changes.
    ProgramChange { tick: u64, channel: u8, program: u8 },
    /// A controller moves: (controller number, 7-bit value).
    ControlChange {
        tick: u64,
        channel: u8,
        controller: u8,
        value: u8,
    },
    /// The pitch wheel moves. `value` is the raw 14-bit position; 8192 is
    /// center.
    PitchBend { tick: u64, channel: u8, value: u16 },
}

/// Controller number for the bank select MSB.
pub const CC_BANK_SELECT_MSB: u8 = 0;

/// Controller number for the modulation wheel.
pub const CC_MODULATION_WHEEL: u8 = 1;

/// Center position of the 14-bit pitch wheel.
pub const PITCH_BEND_CENTER: u16 = 8192;

impl MidiEvent {
    /// The absolute tick at which this event occurs.
    pub fn tick(&self) -> u64 {
        match *self {
            MidiEvent::NoteOn { tick, .. }
            | MidiEvent::NoteOff { tick, .. }
            | MidiEvent::ProgramChange { tick, .. }
            | MidiEvent::ControlChange { tick, .. }
            | MidiEvent::PitchBend { tick, .. } => tick,
        }
    }

    /// The channel this event occurs on.
    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ProgramChange { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. } => channel,
        }
    }

    /// Whether this is a note-on or note-off event.
    pub fn is_note(&self) -> bool {
        matches!(
            self,
            MidiEvent::NoteOn { .. } | MidiEvent::NoteOff { .. }
        )
    }

    /// Whether this is a note-on event.
    pub fn is_note_on(&self) -> bool {
        matches!(self, MidiEvent::NoteOn { .. })
    }

    /// The note number, for note events.
    pub fn note(&self) -> Option<u8> {
        match *self {
            MidiEvent::NoteOn { note, .. } | MidiEvent::NoteOff { note, .. } => Some(note),
            _ => None,
        }
    }
}

/// Computes the maximum number of simultaneously-sounding notes in a list of
/// note events sorted by tick.
///
/// Used to decide whether a synth-lead patch is being played as a lead or as a
/// chord pad.
pub fn max_polyphony(events: &[MidiEvent]) -> usize {
    let mut current: usize = 0;
    let mut max: usize = 0;
    for event in events {
        match event {
            MidiEvent::NoteOn { .. } => {
                current += 1;
                max = max.max(current);
            }
            MidiEvent::NoteOff { .. } => current = current.saturating_sub(1),
            _ => {}
        }
    }
    max
}
