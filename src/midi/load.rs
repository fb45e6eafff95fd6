//! Adapter from a parsed Standard MIDI File to this crate's event model.
//!
//! `midly` handles the wire format; this module flattens delta ticks into
//! absolute ticks, normalizes note-on events with velocity zero into
//! note-offs, and extracts the tempo map. This is the only fallible surface
//! in the crate: everything downstream degrades instead of failing.

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use thiserror::Error;

use super::event::MidiEvent;
use super::tempo::TempoMap;

/// A parsed MIDI sequence: per-track channel events plus the tempo map.
#[derive(Debug, Clone)]
pub struct Sequence {
    /// Channel-scoped events per track, each sorted by tick.
    pub tracks: Vec<Vec<MidiEvent>>,
    /// The file's tick-to-seconds mapping.
    pub tempo: TempoMap,
}

impl Sequence {
    /// Wall-clock time of the last event, in seconds.
    pub fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .flatten()
            .map(|event| self.tempo.tick_to_seconds(event.tick()))
            .fold(0.0, f64::max)
    }
}

/// Errors raised while reading a MIDI file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to parse MIDI data: {0}")]
    Parse(#[from] midly::Error),
    #[error("SMPTE timecode division is not supported")]
    UnsupportedTiming,
}

/// Parses raw `.mid` bytes into a [`Sequence`].
pub fn load_sequence(bytes: &[u8]) -> Result<Sequence, LoadError> {
    let smf = Smf::parse(bytes)?;
    from_smf(&smf)
}

/// Converts an already-parsed [`Smf`] into a [`Sequence`].
pub fn from_smf(smf: &Smf<'_>) -> Result<Sequence, LoadError> {
    let division = match smf.header.timing {
        Timing::Metrical(ticks) => ticks.as_int(),
        Timing::Timecode(..) => return Err(LoadError::UnsupportedTiming),
    };

    let mut tempo_events = Vec::new();
    let mut tracks = Vec::with_capacity(smf.tracks.len());

    for track in &smf.tracks {
        let mut events = Vec::new();
        let mut tick: u64 = 0;

        for event in track {
            tick += event.delta.as_int() as u64;

            match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(us_per_quarter)) => {
                    tempo_events.push((tick, us_per_quarter.as_int()));
                }
                TrackEventKind::Midi { channel, message } => {
                    let channel = u8::from(channel);
                    let converted = match message {
                        // Velocity-zero note-on is a note-off in disguise.
                        MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => {
                            Some(MidiEvent::NoteOff {
                                tick,
                                channel,
                                note: key.as_int(),
                            })
                        }
                        MidiMessage::NoteOn { key, vel } => Some(MidiEvent::NoteOn {
                            tick,
                            channel,
                            note: key.as_int(),
                            velocity: vel.as_int(),
                        }),
                        MidiMessage::NoteOff { key, .. } => Some(MidiEvent::NoteOff {
                            tick,
                            channel,
                            note: key.as_int(),
                        }),
                        MidiMessage::ProgramChange { program } => Some(MidiEvent::ProgramChange {
                            tick,
                            channel,
                            program: program.as_int(),
                        }),
                        MidiMessage::Controller { controller, value } => {
                            Some(MidiEvent::ControlChange {
                                tick,
                                channel,
                                controller: controller.as_int(),
                                value: value.as_int(),
                            })
                        }
                        MidiMessage::PitchBend { bend } => Some(MidiEvent::PitchBend {
                            tick,
                            channel,
                            value: bend.0.as_int(),
                        }),
                        _ => None,
                    };
                    if let Some(converted) = converted {
                        events.push(converted);
                    }
                }
                _ => {}
            }
        }

        tracks.push(events);
    }

    Ok(Sequence {
        tracks,
        tempo: TempoMap::new(division, tempo_events),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::{Format, Header, Track, TrackEvent};

    fn smf_with(events: Vec<TrackEvent<'static>>) -> Smf<'static> {
        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Metrical(480.into()),
        ));
        let mut track = Track::new();
        track.extend(events);
        smf.tracks.push(track);
        smf
    }

    fn midi_event(delta: u32, message: MidiMessage) -> TrackEvent<'static> {
        TrackEvent {
            delta: delta.into(),
            kind: TrackEventKind::Midi {
                channel: 0.into(),
                message,
            },
        }
    }

    #[test]
    fn test_accumulates_delta_ticks() {
        let smf = smf_with(vec![
            midi_event(
                10,
                MidiMessage::NoteOn {
                    key: 60.into(),
                    vel: 100.into(),
                },
            ),
            midi_event(
                20,
                MidiMessage::NoteOff {
                    key: 60.into(),
                    vel: 0.into(),
                },
            ),
        ]);
        let sequence = from_smf(&smf).unwrap();

        assert_eq!(sequence.tracks[0][0].tick(), 10);
        assert_eq!(sequence.tracks[0][1].tick(), 30);
    }

    #[test]
    fn test_velocity_zero_note_on_becomes_note_off() {
        let smf = smf_with(vec![midi_event(
            0,
            MidiMessage::NoteOn {
                key: 60.into(),
                vel: 0.into(),
            },
        )]);
        let sequence = from_smf(&smf).unwrap();

        assert!(matches!(
            sequence.tracks[0][0],
            MidiEvent::NoteOff { note: 60, .. }
        ));
    }

    #[test]
    fn test_tempo_meta_feeds_tempo_map() {
        let smf = smf_with(vec![
            TrackEvent {
                delta: 0.into(),
                kind: TrackEventKind::Meta(MetaMessage::Tempo(1_000_000.into())),
            },
            midi_event(
                480,
                MidiMessage::NoteOn {
                    key: 60.into(),
                    vel: 100.into(),
                },
            ),
        ]);
        let sequence = from_smf(&smf).unwrap();

        // 60 BPM: one beat = one second.
        assert!((sequence.tempo.tick_to_seconds(480) - 1.0).abs() < 1e-9);
    }
}
