//! Note arcs.
//!
//! A [`TimedArc`] is one matched note-on/note-off pair: the block you would
//! see in a piano-roll editor. Arcs carry both tick and second endpoints so
//! per-frame code never touches the tempo map.

use log::{debug, warn};

use super::event::MidiEvent;
use super::tempo::TempoMap;

/// One playable note interval.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedArc {
    /// MIDI note number.
    pub note: u8,
    /// Velocity of the note-on that opened this arc.
    pub velocity: u8,
    /// Tick of the note-on.
    pub start_tick: u64,
    /// Tick of the note-off. Always greater than `start_tick`.
    pub end_tick: u64,
    /// Wall-clock start, in seconds.
    pub start: f64,
    /// Wall-clock end, in seconds.
    pub end: f64,
}

impl TimedArc {
    /// Length of this arc in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `time` falls inside this arc's half-open interval.
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time < self.end
    }
}

/// Pairs note-on and note-off events into arcs.
///
/// Events must be sorted by tick. A note-off with no open note-on of the same
/// pitch is discarded with a warning; this is a recoverable data-integrity
/// issue, not a failure. Note-ons still open at the end of the list never
/// became playable notes and are dropped. The result is sorted by start tick.
pub fn build_arcs(events: &[MidiEvent], tempo: &TempoMap) -> Vec<TimedArc> {
    let mut open: [Option<(u64, u8)>; 128] = [None; 128];
    let mut arcs = Vec::new();

    for event in events {
        match *event {
            MidiEvent::NoteOn {
                tick,
                note,
                velocity,
                ..
            } => {
                open[note as usize] = Some((tick, velocity));
            }
            MidiEvent::NoteOff { tick, note, .. } => match open[note as usize].take() {
                Some((start_tick, velocity)) => {
                    if tick <= start_tick {
                        debug!("Dropping zero-length note {note} at tick {tick}");
                        continue;
                    }
                    arcs.push(TimedArc {
                        note,
                        velocity,
                        start_tick,
                        end_tick: tick,
                        start: tempo.tick_to_seconds(start_tick),
                        end: tempo.tick_to_seconds(tick),
                    });
                }
                None => warn!("Unbalanced MIDI note events: stray note-off {note} at tick {tick}"),
            },
            _ => {}
        }
    }

    arcs.sort_by(|a, b| {
        (a.start_tick, a.end_tick, a.note).cmp(&(b.start_tick, b.end_tick, b.note))
    });
    arcs.dedup();
    arcs
}

/// A set of arcs with overlapping sounding intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcGroup {
    /// The arcs in this group, in start order.
    pub arcs: Vec<TimedArc>,
}

impl ArcGroup {
    /// Tick at which the earliest arc in this group begins.
    pub fn start_tick(&self) -> u64 {
        self.arcs.iter().map(|arc| arc.start_tick).min().unwrap_or(0)
    }

    /// Tick at which the last arc in this group ends.
    pub fn end_tick(&self) -> u64 {
        self.arcs.iter().map(|arc| arc.end_tick).max().unwrap_or(0)
    }
}

/// Splits a start-sorted arc list into groups of overlapping arcs.
///
/// Three notes struck as a chord form one group, but any amount of overlap
/// joins arcs into the same group. Useful for instruments that animate whole
/// chords as a unit.
pub fn contiguous_groups(arcs: &[TimedArc]) -> Vec<ArcGroup> {
    if arcs.is_empty() {
        return Vec::new();
    }

    let mut groups = Vec::new();
    let mut current: Vec<TimedArc> = vec![arcs[0]];
    let mut furthest = arcs[0].end_tick;

    for &arc in &arcs[1..] {
        if arc.start_tick >= furthest {
            groups.push(ArcGroup {
                arcs: std::mem::replace(&mut current, vec![arc]),
            });
            furthest = arc.end_tick;
        } else {
            current.push(arc);
            furthest = furthest.max(arc.end_tick);
        }
    }

    groups.push(ArcGroup { arcs: current });
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(tick: u64, note: u8) -> MidiEvent {
        MidiEvent::NoteOn {
            tick,
            channel: 0,
            note,
            velocity: 100,
        }
    }

    fn off(tick: u64, note: u8) -> MidiEvent {
        MidiEvent::NoteOff {
            tick,
            channel: 0,
            note,
        }
    }

    fn arc(start_tick: u64, end_tick: u64, note: u8) -> TimedArc {
        TimedArc {
            note,
            velocity: 100,
            start_tick,
            end_tick,
            start: start_tick as f64,
            end: end_tick as f64,
        }
    }

    #[test]
    fn test_pairs_simple_notes() {
        let tempo = TempoMap::default();
        let events = vec![on(0, 60), off(480, 60), on(480, 62), off(960, 62)];
        let arcs = build_arcs(&events, &tempo);

        assert_eq!(arcs.len(), 2);
        assert_eq!(arcs[0].note, 60);
        assert_eq!(arcs[0].start_tick, 0);
        assert_eq!(arcs[0].end_tick, 480);
        assert_eq!(arcs[1].note, 62);
    }

    #[test]
    fn test_stray_note_off_is_dropped() {
        let tempo = TempoMap::default();
        let events = vec![off(0, 60), on(10, 62), off(20, 62)];
        let arcs = build_arcs(&events, &tempo);

        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].note, 62);
    }

    #[test]
    fn test_trailing_note_on_produces_no_arc() {
        let tempo = TempoMap::default();
        let events = vec![on(0, 60), off(10, 60), on(20, 64)];
        assert_eq!(build_arcs(&events, &tempo).len(), 1);
    }

    #[test]
    fn test_arc_times_follow_tempo_map() {
        let tempo = TempoMap::new(480, [(0, 500_000)]);
        let events = vec![on(0, 60), off(480, 60)];
        let arcs = build_arcs(&events, &tempo);

        assert!((arcs[0].start - 0.0).abs() < 1e-9);
        assert!((arcs[0].end - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_contains_is_half_open() {
        let a = arc(0, 480, 60);
        assert!(a.contains(0.0));
        assert!(a.contains(479.0));
        assert!(!a.contains(480.0));
    }

    #[test]
    fn test_contiguous_groups_chord() {
        // Chord of three, then a separate note.
        let arcs = vec![arc(0, 100, 60), arc(0, 100, 64), arc(0, 100, 67), arc(100, 200, 72)];
        let groups = contiguous_groups(&arcs);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].arcs.len(), 3);
        assert_eq!(groups[1].arcs.len(), 1);
    }

    #[test]
    fn test_contiguous_groups_partial_overlap() {
        // Any overlap joins a group, including one carried by an earlier arc.
        let arcs = vec![arc(0, 300, 60), arc(100, 150, 62), arc(200, 400, 64), arc(400, 500, 65)];
        let groups = contiguous_groups(&arcs);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].arcs.len(), 3);
        assert_eq!(groups[1].arcs.len(), 1);
    }

    #[test]
    fn test_contiguous_groups_empty() {
        assert!(contiguous_groups(&[]).is_empty());
    }
}
