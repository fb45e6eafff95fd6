//! Channel-10 percussion dispatch.
//!
//! A rhythm-channel program bin can yield several visual units at once: a
//! drum kit animated from every hit in the bin, a handful of special-case
//! melodic stand-ins for certain kit programs, and one unit per auxiliary
//! voice (cowbell, tambourine, and friends). The note tables below come from
//! the General MIDI level 2 kit layouts.

use crate::midi::MidiEvent;

/// Drum shell finishes for the standard kit family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrumShell {
    Standard,
    Room,
    Power,
    Jazz,
}

impl DrumShell {
    fn from_program(program: u8) -> Option<Self> {
        match program {
            0 => Some(Self::Standard),
            8 => Some(Self::Room),
            16 => Some(Self::Power),
            32 => Some(Self::Jazz),
            _ => None,
        }
    }
}

/// Which drum kit visual a rhythm program selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DrumKitVariant {
    Electronic,
    /// Analog shells with electronic cymbals.
    Analog,
    Brush,
    Orchestra,
    Typical(DrumShell),
}

/// A single-voice percussion unit that lives outside the kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuxiliaryVoice {
    HighQ,
    Slap,
    Turntable,
    Sticks,
    SquareClick,
    Metronome,
    HandClap,
    Tambourine,
    Cowbell,
    Bongos,
    Congas,
    Timbales,
    Agogo,
    Cabasa,
    Maracas,
    Whistle,
    Guiro,
    Claves,
    Woodblock,
    Cuica,
    Triangle,
    Shaker,
    JingleBell,
    Castanets,
    Surdo,
}

/// A percussion visual other than an auxiliary voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PercussionSpec {
    DrumKit(DrumKitVariant),
    /// Sustained swell cued by note 52 on the electronic kit.
    ReverseCymbal,
    /// Orchestra kit rolls, notes 41 through 53.
    Timpani,
    ApplauseChoir,
    Helicopter,
}

/// The kit visual for a rhythm program, or `None` when the program has no
/// kit at all (the SFX kit is auxiliary voices only).
pub fn kit_variant(program: u8) -> Option<DrumKitVariant> {
    match program {
        24 => Some(DrumKitVariant::Electronic),
        25 => Some(DrumKitVariant::Analog),
        40 => Some(DrumKitVariant::Brush),
        48 => Some(DrumKitVariant::Orchestra),
        56 => None,
        _ => Some(DrumKitVariant::Typical(
            DrumShell::from_program(program).unwrap_or(DrumShell::Standard),
        )),
    }
}

/// Every hit (note-on) in the bin, in order. The kit visual reacts to all of
/// them, including notes that also drive auxiliary voices.
pub fn kit_hits(events: &[MidiEvent]) -> Vec<MidiEvent> {
    events.iter().filter(|e| e.is_note_on()).copied().collect()
}

/// Melodic stand-ins hiding inside certain kit programs.
pub fn special_cases(program: u8, events: &[MidiEvent]) -> Vec<(PercussionSpec, Vec<MidiEvent>)> {
    let mut specials = Vec::new();

    match program {
        // Electronic: note 52 is a reverse cymbal swell. The pitch carries no
        // meaning, so hits are standardized to middle C.
        24 => {
            let cymbal: Vec<_> = notes(events, &[52])
                .into_iter()
                .map(|event| match event {
                    MidiEvent::NoteOn {
                        tick,
                        channel,
                        velocity,
                        ..
                    } => MidiEvent::NoteOn {
                        tick,
                        channel,
                        note: 60,
                        velocity,
                    },
                    MidiEvent::NoteOff { tick, channel, .. } => MidiEvent::NoteOff {
                        tick,
                        channel,
                        note: 60,
                    },
                    other => other,
                })
                .collect();
            if !cymbal.is_empty() {
                specials.push((PercussionSpec::ReverseCymbal, cymbal));
            }
        }

        // Orchestra: timpani rolls and an applause patch.
        48 => {
            let timpani = notes(events, &[41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 53]);
            if !timpani.is_empty() {
                specials.push((PercussionSpec::Timpani, timpani));
            }
            let applause = notes(events, &[88]);
            if !applause.is_empty() {
                specials.push((PercussionSpec::ApplauseChoir, applause));
            }
        }

        // SFX: applause and helicopter.
        56 => {
            let applause = notes(events, &[58]);
            if !applause.is_empty() {
                specials.push((PercussionSpec::ApplauseChoir, applause));
            }
            let helicopter = notes(events, &[70]);
            if !helicopter.is_empty() {
                specials.push((PercussionSpec::Helicopter, helicopter));
            }
        }

        _ => {}
    }

    specials
}

/// Auxiliary voice note layout for a kit program.
type VoiceTable = &'static [(AuxiliaryVoice, &'static [u8])];

const ORCHESTRA_VOICES: VoiceTable = &[
    (AuxiliaryVoice::Sticks, &[31]),
    (AuxiliaryVoice::SquareClick, &[32]),
    (AuxiliaryVoice::Metronome, &[33, 34]),
    // Castanets appear at both the hand-clap slot and their usual slot.
    (AuxiliaryVoice::Castanets, &[39, 85]),
    (AuxiliaryVoice::Tambourine, &[54]),
    (AuxiliaryVoice::Cowbell, &[56]),
    (AuxiliaryVoice::Bongos, &[60, 61]),
    (AuxiliaryVoice::Congas, &[62, 63, 64]),
    (AuxiliaryVoice::Timbales, &[65, 66]),
    (AuxiliaryVoice::Agogo, &[67, 68]),
    (AuxiliaryVoice::Cabasa, &[69]),
    (AuxiliaryVoice::Maracas, &[70]),
    (AuxiliaryVoice::Whistle, &[71, 72]),
    (AuxiliaryVoice::Guiro, &[73, 74]),
    (AuxiliaryVoice::Claves, &[75]),
    (AuxiliaryVoice::Woodblock, &[76, 77]),
    (AuxiliaryVoice::Cuica, &[78, 79]),
    (AuxiliaryVoice::Triangle, &[80, 81]),
    (AuxiliaryVoice::Shaker, &[82]),
    (AuxiliaryVoice::JingleBell, &[83]),
    (AuxiliaryVoice::Surdo, &[86, 87]),
];

const SFX_VOICES: VoiceTable = &[
    (AuxiliaryVoice::HighQ, &[39]),
    (AuxiliaryVoice::Slap, &[40]),
    (AuxiliaryVoice::Turntable, &[41, 42]),
    (AuxiliaryVoice::Sticks, &[43]),
    (AuxiliaryVoice::SquareClick, &[44]),
    (AuxiliaryVoice::Metronome, &[45, 46]),
];

const DEFAULT_VOICES: VoiceTable = &[
    (AuxiliaryVoice::HighQ, &[27]),
    (AuxiliaryVoice::Slap, &[28]),
    (AuxiliaryVoice::Turntable, &[29, 30]),
    (AuxiliaryVoice::Sticks, &[31]),
    (AuxiliaryVoice::SquareClick, &[32]),
    (AuxiliaryVoice::Metronome, &[33, 34]),
    (AuxiliaryVoice::HandClap, &[39]),
    (AuxiliaryVoice::Tambourine, &[54]),
    (AuxiliaryVoice::Cowbell, &[56]),
    (AuxiliaryVoice::Bongos, &[60, 61]),
    (AuxiliaryVoice::Congas, &[62, 63, 64]),
    (AuxiliaryVoice::Timbales, &[65, 66]),
    (AuxiliaryVoice::Agogo, &[67, 68]),
    (AuxiliaryVoice::Cabasa, &[69]),
    (AuxiliaryVoice::Maracas, &[70]),
    (AuxiliaryVoice::Whistle, &[71, 72]),
    (AuxiliaryVoice::Guiro, &[73, 74]),
    (AuxiliaryVoice::Claves, &[75]),
    (AuxiliaryVoice::Woodblock, &[76, 77]),
    (AuxiliaryVoice::Cuica, &[78, 79]),
    (AuxiliaryVoice::Triangle, &[80, 81]),
    (AuxiliaryVoice::Shaker, &[82]),
    (AuxiliaryVoice::JingleBell, &[83]),
    (AuxiliaryVoice::Castanets, &[85]),
    (AuxiliaryVoice::Surdo, &[86, 87]),
];

fn voice_table(program: u8) -> VoiceTable {
    match program {
        48 => ORCHESTRA_VOICES,
        56 => SFX_VOICES,
        _ => DEFAULT_VOICES,
    }
}

/// Splits a bin's hits among the auxiliary voices of its kit program.
/// Voices with no hits are omitted.
pub fn auxiliary_hits(program: u8, events: &[MidiEvent]) -> Vec<(AuxiliaryVoice, Vec<MidiEvent>)> {
    voice_table(program)
        .iter()
        .filter_map(|&(voice, voice_notes)| {
            let voice_hits = hits(events, voice_notes);
            if voice_hits.is_empty() {
                None
            } else {
                Some((voice, voice_hits))
            }
        })
        .collect()
}

fn notes(events: &[MidiEvent], wanted: &[u8]) -> Vec<MidiEvent> {
    events
        .iter()
        .filter(|event| {
            event.is_note() && event.note().map_or(false, |note| wanted.contains(&note))
        })
        .copied()
        .collect()
}

fn hits(events: &[MidiEvent], wanted: &[u8]) -> Vec<MidiEvent> {
    events
        .iter()
        .filter(|event| {
            event.is_note_on() && event.note().map_or(false, |note| wanted.contains(&note))
        })
        .copied()
        .collect()
}
