//! Instrument assignment.
//!
//! Turns a parsed MIDI sequence into the list of instruments that should
//! portray it. Events are partitioned by channel, then by the `(bank MSB,
//! program)` patch in effect when they occur. Each melodic bin dispatches
//! through the General MIDI table; the rhythm channel splits into drum kits,
//! special-case stand-ins, and auxiliary voices instead.

pub mod patch;
pub mod percussion;

pub use patch::InstrumentSpec;

use log::{debug, warn};

use crate::instrument::{Instrument, Role};
use crate::midi::event::CC_BANK_SELECT_MSB;
use crate::midi::{MidiEvent, TempoMap};
use crate::{CHANNEL_COUNT, PERCUSSION_CHANNEL};

use percussion::AuxiliaryVoice;

/// A `(bank MSB, program)` pair identifying one patch bin.
type PatchKey = (u8, u8);

/// Assigns instruments to a MIDI sequence.
///
/// `on_progress` receives fractional completion in `[0, 1]`, reported once
/// per patch bin, so a loading screen can track the one-shot construction.
pub fn assign(
    tracks: &[Vec<MidiEvent>],
    tempo: &TempoMap,
    mut on_progress: impl FnMut(f32),
) -> Vec<Instrument> {
    let channels = partition_channels(tracks);

    let mut instruments = Vec::new();
    // Auxiliary voices accumulate across kit programs; their hits merge into
    // one instrument per voice at the end.
    let mut auxiliary: Vec<(AuxiliaryVoice, Vec<MidiEvent>)> = Vec::new();

    for (channel, events) in channels.iter().enumerate() {
        let channel = channel as u8;
        let bins = partition_patches(channel, events);

        for (i, (key, bin)) in bins.iter().enumerate() {
            on_progress(channel as f32 / CHANNEL_COUNT as f32
                + i as f32 / bins.len() as f32 / CHANNEL_COUNT as f32);

            if channel == PERCUSSION_CHANNEL {
                build_percussion(channel, key.1, bin, tempo, &mut instruments, &mut auxiliary);
            } else if let Some(instrument) = build_melodic(channel, *key, bin, events, tempo) {
                instruments.push(instrument);
            }
        }
    }

    for (voice, hits) in auxiliary {
        instruments.push(Instrument::from_hits(
            Role::Auxiliary(voice),
            PERCUSSION_CHANNEL,
            hits,
            tempo,
        ));
    }

    on_progress(1.0);
    debug!("assigned {} instruments", instruments.len());
    instruments
}

/// Flattens tracks into one time-sorted event list per channel.
fn partition_channels(tracks: &[Vec<MidiEvent>]) -> Vec<Vec<MidiEvent>> {
    let mut channels = vec![Vec::new(); CHANNEL_COUNT];
    for track in tracks {
        for event in track {
            channels[event.channel() as usize].push(*event);
        }
    }
    for channel in &mut channels {
        channel.sort_by_key(MidiEvent::tick);
    }
    channels
}

/// Splits one channel's events into patch bins, in first-appearance order.
///
/// A note-off lands in the bin its note-on went to, so a mid-note program
/// change never strands the release. A note-off whose note was never seen
/// falls back to the patch in effect at its own tick.
fn partition_patches(channel: u8, events: &[MidiEvent]) -> Vec<(PatchKey, Vec<MidiEvent>)> {
    let mut program_events: Vec<MidiEvent> = events
        .iter()
        .filter(|e| matches!(e, MidiEvent::ProgramChange { .. }))
        .copied()
        .collect();
    if program_events.is_empty() {
        program_events.push(MidiEvent::ProgramChange {
            tick: 0,
            channel,
            program: 0,
        });
    }
    dedup_program_changes(&mut program_events);

    let bank_events: Vec<MidiEvent> = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                MidiEvent::ControlChange {
                    controller: CC_BANK_SELECT_MSB,
                    ..
                }
            )
        })
        .copied()
        .collect();

    let mut bins: Vec<(PatchKey, Vec<MidiEvent>)> = Vec::new();
    // Sticky binding captured at note-on, so the matching note-off follows
    // its note into the same bin.
    let mut patch_per_note: [Option<PatchKey>; 128] = [None; 128];

    // Both side lists are sorted, so the patch in effect advances with a
    // cursor rather than a search per event.
    let mut program_cursor = 0usize;
    let mut bank_cursor = 0usize;
    let mut current_program = 0u8;
    let mut current_bank = 0u8;

    for event in events {
        while program_cursor < program_events.len()
            && program_events[program_cursor].tick() <= event.tick()
        {
            if let MidiEvent::ProgramChange { program, .. } = program_events[program_cursor] {
                current_program = program;
            }
            program_cursor += 1;
        }
        while bank_cursor < bank_events.len() && bank_events[bank_cursor].tick() <= event.tick() {
            if let MidiEvent::ControlChange { value, .. } = bank_events[bank_cursor] {
                current_bank = value;
            }
            bank_cursor += 1;
        }

        let current_key = (current_bank, current_program);
        if !bins.iter().any(|(key, _)| *key == current_key) {
            bins.push((current_key, Vec::new()));
        }

        match event {
            MidiEvent::NoteOff { note, .. } => {
                let note_key = patch_per_note[*note as usize].unwrap_or(current_key);
                match bins.iter_mut().find(|(key, _)| *key == note_key) {
                    Some((_, bin)) => bin.push(*event),
                    None => warn!(
                        "Unbalanced MIDI note events: stray note-off for note {} on channel {}",
                        note, channel
                    ),
                }
            }
            other => {
                if let MidiEvent::NoteOn { note, .. } = other {
                    patch_per_note[*note as usize] = Some(current_key);
                }
                if let Some((_, bin)) = bins.iter_mut().find(|(key, _)| *key == current_key) {
                    bin.push(*other);
                }
            }
        }
    }

    bins
}

/// Collapses redundant program changes, in two passes whose order matters:
/// changes sharing a tick keep only the last, then consecutive changes to
/// the same program keep only the first. The result is idempotent.
pub fn dedup_program_changes(events: &mut Vec<MidiEvent>) {
    let mut kept: Vec<MidiEvent> = Vec::with_capacity(events.len());
    for event in events.drain(..) {
        if let Some(last) = kept.last_mut() {
            if last.tick() == event.tick() {
                *last = event;
                continue;
            }
        }
        kept.push(event);
    }

    kept.dedup_by(|later, earlier| program_of(earlier) == program_of(later));
    *events = kept;
}

fn program_of(event: &MidiEvent) -> Option<u8> {
    match event {
        MidiEvent::ProgramChange { program, .. } => Some(*program),
        _ => None,
    }
}

fn build_melodic(
    channel: u8,
    key: PatchKey,
    bin: &[MidiEvent],
    all_channel_events: &[MidiEvent],
    tempo: &TempoMap,
) -> Option<Instrument> {
    let note_events: Vec<MidiEvent> = bin.iter().filter(|e| e.is_note()).copied().collect();
    if note_events.is_empty() {
        return None;
    }

    let spec = patch::melodic_spec(key.0, key.1, &note_events)?;

    // Controller state is sticky across program changes, so the instrument
    // sees every control change on its channel, not just its bin's.
    let mut events: Vec<MidiEvent> = bin
        .iter()
        .filter(|e| !matches!(e, MidiEvent::ControlChange { .. }))
        .chain(
            all_channel_events
                .iter()
                .filter(|e| matches!(e, MidiEvent::ControlChange { .. })),
        )
        .copied()
        .collect();
    events.sort_by_key(MidiEvent::tick);

    Some(Instrument::from_arcs(Role::Melodic(spec), channel, &events, tempo))
}

fn build_percussion(
    channel: u8,
    program: u8,
    bin: &[MidiEvent],
    tempo: &TempoMap,
    instruments: &mut Vec<Instrument>,
    auxiliary: &mut Vec<(AuxiliaryVoice, Vec<MidiEvent>)>,
) {
    let hits = percussion::kit_hits(bin);
    if !hits.is_empty() {
        if let Some(variant) = percussion::kit_variant(program) {
            instruments.push(Instrument::from_hits(
                Role::Kit(variant),
                channel,
                hits,
                tempo,
            ));
        }
    }

    for (spec, events) in percussion::special_cases(program, bin) {
        instruments.push(Instrument::from_arcs(
            Role::Special(spec),
            channel,
            &events,
            tempo,
        ));
    }

    for (voice, hits) in percussion::auxiliary_hits(program, bin) {
        match auxiliary.iter_mut().find(|(v, _)| *v == voice) {
            Some((_, merged)) => {
                merged.extend(hits);
                merged.sort_by_key(MidiEvent::tick);
            }
            None => auxiliary.push((voice, hits)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(tick: u64, program: u8) -> MidiEvent {
        MidiEvent::ProgramChange {
            tick,
            channel: 0,
            program,
        }
    }

    #[test]
    fn test_dedup_same_tick_keeps_last() {
        let mut events = vec![program(0, 10), program(0, 20), program(100, 30)];
        dedup_program_changes(&mut events);
        assert_eq!(events, vec![program(0, 20), program(100, 30)]);
    }

    #[test]
    fn test_dedup_consecutive_same_program_keeps_first() {
        let mut events = vec![program(0, 10), program(50, 10), program(100, 10)];
        dedup_program_changes(&mut events);
        assert_eq!(events, vec![program(0, 10)]);
    }

    #[test]
    fn test_dedup_pass_order() {
        // The same-tick pass runs first: at tick 50 the later change to 10
        // wins, and only then does the run of 10s collapse.
        let mut events = vec![program(0, 10), program(50, 20), program(50, 10), program(100, 10)];
        dedup_program_changes(&mut events);
        assert_eq!(events, vec![program(0, 10)]);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let mut events = vec![program(0, 10), program(0, 20), program(50, 20), program(100, 30)];
        dedup_program_changes(&mut events);
        let once = events.clone();
        dedup_program_changes(&mut events);
        assert_eq!(events, once);
    }

    fn note_on(tick: u64, channel: u8, note: u8) -> MidiEvent {
        MidiEvent::NoteOn {
            tick,
            channel,
            note,
            velocity: 100,
        }
    }

    fn note_off(tick: u64, channel: u8, note: u8) -> MidiEvent {
        MidiEvent::NoteOff {
            tick,
            channel,
            note,
        }
    }

    #[test]
    fn test_assign_defaults_to_grand_piano() {
        let tempo = TempoMap::default();
        let tracks = vec![vec![note_on(0, 0, 60), note_off(480, 0, 60)]];
        let instruments = assign(&tracks, &tempo, |_| {});

        assert_eq!(instruments.len(), 1);
        assert_eq!(
            instruments[0].role(),
            Role::Melodic(InstrumentSpec::Keyboard(patch::KeyboardVariant::Grand))
        );
    }

    #[test]
    fn test_note_off_follows_its_note_on_across_program_change() {
        let tempo = TempoMap::default();
        // The program changes to trombone while the piano note is held; the
        // release still reaches the piano's bin and closes its arc.
        let tracks = vec![vec![
            note_on(0, 0, 60),
            program(240, 57),
            note_off(480, 0, 60),
            note_on(960, 0, 62),
            note_off(1440, 0, 62),
        ]];
        let instruments = assign(&tracks, &tempo, |_| {});

        assert_eq!(instruments.len(), 2);
        let piano = instruments
            .iter()
            .find(|i| {
                i.role() == Role::Melodic(InstrumentSpec::Keyboard(patch::KeyboardVariant::Grand))
            })
            .unwrap();
        // A closed arc, not a stray.
        assert_eq!(piano.recent_arcs().len(), 0);
        let mut piano = piano.clone();
        piano.tick(0.0, 0.016);
        assert_eq!(piano.current_arcs().len(), 1);
        piano.tick(0.5, 0.016);
        assert!(piano.current_arcs().is_empty());
    }

    #[test]
    fn test_empty_bin_constructs_nothing() {
        let tempo = TempoMap::default();
        // Program change and controller traffic but no notes.
        let tracks = vec![vec![
            program(0, 57),
            MidiEvent::ControlChange {
                tick: 0,
                channel: 0,
                controller: 7,
                value: 100,
            },
        ]];
        assert!(assign(&tracks, &tempo, |_| {}).is_empty());
    }

    #[test]
    fn test_unmapped_program_constructs_nothing() {
        let tempo = TempoMap::default();
        // Program 69 (english horn) has no visual.
        let tracks = vec![vec![program(0, 69), note_on(0, 0, 60), note_off(480, 0, 60)]];
        assert!(assign(&tracks, &tempo, |_| {}).is_empty());
    }

    #[test]
    fn test_rhythm_channel_builds_kit_and_auxiliary() {
        let tempo = TempoMap::default();
        let tracks = vec![vec![
            note_on(0, 9, 38),  // snare
            note_on(480, 9, 56), // cowbell
        ]];
        let instruments = assign(&tracks, &tempo, |_| {});

        assert!(instruments.iter().any(|i| matches!(i.role(), Role::Kit(_))));
        assert!(instruments
            .iter()
            .any(|i| i.role() == Role::Auxiliary(AuxiliaryVoice::Cowbell)));
    }

    #[test]
    fn test_progress_is_monotonic_and_completes() {
        let tempo = TempoMap::default();
        let tracks = vec![vec![note_on(0, 0, 60), note_off(480, 0, 60), note_on(0, 9, 38)]];

        let mut reports = Vec::new();
        assign(&tracks, &tempo, |p| reports.push(p));

        assert!(reports.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reports.last().copied(), Some(1.0));
    }
}
