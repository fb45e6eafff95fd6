//! General MIDI patch dispatch.
//!
//! Maps a `(bank MSB, program)` pair to the visual instrument that should
//! portray it. Bank 0 is the standard melodic map; bank 8 carries a reduced
//! set of variant patches that still map onto the bank-0 visuals. Every
//! other bank is unmapped and produces no instrument.

use crate::midi::event::max_polyphony;
use crate::midi::MidiEvent;

/// Keyboard skin variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyboardVariant {
    Grand,
    BrightAcoustic,
    ElectricGrand,
    HonkyTonk,
    Electric1,
    Electric2,
    Harpsichord,
    Clavichord,
    Celesta,
    Wood,
    Square,
    Saw,
    Chiff,
    Charang,
    BassAndLead,
    NewAge,
    Warm,
    Polysynth,
    Choir,
    Metallic,
    Sweep,
    Synth,
    Atmosphere,
    Echoes,
}

/// Mallet instrument variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MalletVariant {
    Glockenspiel,
    Vibraphone,
    Marimba,
    Xylophone,
}

/// Guitar skin variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GuitarVariant {
    Acoustic,
    Jazz,
    Clean,
    Muted,
    Overdriven,
    Distortion,
    Harmonics,
}

/// Bass guitar variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BassGuitarVariant {
    Standard,
    Fretless,
    Synth1,
    Synth2,
}

/// How an acoustic (upright) bass is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BassPlayingStyle {
    Pizzicato,
    Arco,
}

/// Stage string section variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StageStringsVariant {
    StringEnsemble1,
    StringEnsemble2,
    SynthStrings1,
    SynthStrings2,
    BowedSynth,
}

/// Whether a string section bows normally or tremolos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StringBehavior {
    Normal,
    Tremolo,
}

/// Stage choir variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChoirVariant {
    ChoirAahs,
    VoiceOohs,
    SynthVoice,
    VoiceSynth,
    HaloSynth,
    GoblinSynth,
}

/// Trumpet variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrumpetVariant {
    Normal,
    Muted,
}

/// Stage horn section variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StageHornsVariant {
    BrassSection,
    SynthBrass1,
    SynthBrass2,
}

/// Pan flute pipe skins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PipeSkin {
    Wood,
    Gold,
}

/// Space laser beam waveforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpaceLaserVariant {
    Square,
    Saw,
}

/// A melodic visual instrument kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstrumentSpec {
    Keyboard(KeyboardVariant),
    FifthsKeyboard(KeyboardVariant),
    Mallets(MalletVariant),
    MusicBox,
    TubularBells,
    Accordion,
    Bandoneon,
    Harmonica,
    Guitar(GuitarVariant),
    AcousticBass(BassPlayingStyle),
    BassGuitar(BassGuitarVariant),
    Violin,
    Viola,
    Cello,
    Fiddle,
    StageStrings(StageStringsVariant, StringBehavior),
    PizzicatoStrings,
    Harp,
    Timpani,
    StageChoir(ChoirVariant),
    Trumpet(TrumpetVariant),
    Trombone,
    Tuba,
    FrenchHorn,
    StageHorns(StageHornsVariant),
    SopranoSax,
    AltoSax,
    TenorSax,
    BaritoneSax,
    Oboe,
    Clarinet,
    Piccolo,
    Flute,
    Recorder,
    PanFlute(PipeSkin),
    BlownBottle,
    Whistles,
    Ocarina,
    SpaceLaser(SpaceLaserVariant),
    Banjo,
    Shamisen,
    Kalimba,
    BagPipe,
    TinkleBell,
    Agogos,
    SteelDrums,
    Woodblocks,
    TaikoDrum,
    MelodicTom,
    SynthDrum,
    ReverseCymbal,
    BirdTweet,
    TelephoneRing,
    Helicopter,
    ApplauseChoir,
    Gunshot,
}

/// How many simultaneous notes mark a square or saw patch as chordal rather
/// than a lead line. Lead lines get the space laser.
const SPACE_LASER_POLYPHONY_LIMIT: usize = 4;

/// Resolves the visual instrument for a `(bank, program)` pair.
///
/// `note_events` are the bin's note events, consulted only for the polyphony
/// heuristic on the square and saw lead programs. Returns `None` for unmapped
/// programs and unmapped banks.
pub fn melodic_spec(bank: u8, program: u8, note_events: &[MidiEvent]) -> Option<InstrumentSpec> {
    match bank {
        0 => bank_0_spec(program, note_events),
        8 => bank_8_spec(program),
        _ => None,
    }
}

fn bank_0_spec(program: u8, note_events: &[MidiEvent]) -> Option<InstrumentSpec> {
    use InstrumentSpec::*;

    Some(match program {
        0 => Keyboard(KeyboardVariant::Grand),
        1 => Keyboard(KeyboardVariant::BrightAcoustic),
        2 => Keyboard(KeyboardVariant::ElectricGrand),
        3 => Keyboard(KeyboardVariant::HonkyTonk),
        4 => Keyboard(KeyboardVariant::Electric1),
        5 => Keyboard(KeyboardVariant::Electric2),
        6 => Keyboard(KeyboardVariant::Harpsichord),
        7 => Keyboard(KeyboardVariant::Clavichord),
        8 => Keyboard(KeyboardVariant::Celesta),
        9 => Mallets(MalletVariant::Glockenspiel),
        10 => MusicBox,
        11 => Mallets(MalletVariant::Vibraphone),
        12 => Mallets(MalletVariant::Marimba),
        13 => Mallets(MalletVariant::Xylophone),
        14 | 98 => TubularBells,
        15..=20 | 55 => Keyboard(KeyboardVariant::Wood),
        21 => Accordion,
        22 => Harmonica,
        23 => Bandoneon,
        24 | 25 | 120 => Guitar(GuitarVariant::Acoustic),
        26 => Guitar(GuitarVariant::Jazz),
        27 => Guitar(GuitarVariant::Clean),
        28 => Guitar(GuitarVariant::Muted),
        29 => Guitar(GuitarVariant::Overdriven),
        30 => Guitar(GuitarVariant::Distortion),
        31 => Guitar(GuitarVariant::Harmonics),
        32 => AcousticBass(BassPlayingStyle::Pizzicato),
        33 | 34 | 36 | 37 => BassGuitar(BassGuitarVariant::Standard),
        35 => BassGuitar(BassGuitarVariant::Fretless),
        38 => BassGuitar(BassGuitarVariant::Synth1),
        39 => BassGuitar(BassGuitarVariant::Synth2),
        40 => Violin,
        41 => Viola,
        42 => Cello,
        43 => AcousticBass(BassPlayingStyle::Arco),
        44 => StageStrings(StageStringsVariant::StringEnsemble1, StringBehavior::Tremolo),
        45 => PizzicatoStrings,
        46 => Harp,
        47 => Timpani,
        48 => StageStrings(StageStringsVariant::StringEnsemble1, StringBehavior::Normal),
        49 => StageStrings(StageStringsVariant::StringEnsemble2, StringBehavior::Normal),
        50 => StageStrings(StageStringsVariant::SynthStrings1, StringBehavior::Normal),
        51 => StageStrings(StageStringsVariant::SynthStrings2, StringBehavior::Normal),
        52 => StageChoir(ChoirVariant::ChoirAahs),
        53 => StageChoir(ChoirVariant::VoiceOohs),
        54 => StageChoir(ChoirVariant::SynthVoice),
        56 => Trumpet(TrumpetVariant::Normal),
        57 => Trombone,
        58 => Tuba,
        59 => Trumpet(TrumpetVariant::Muted),
        60 => FrenchHorn,
        61 => StageHorns(StageHornsVariant::BrassSection),
        62 => StageHorns(StageHornsVariant::SynthBrass1),
        63 => StageHorns(StageHornsVariant::SynthBrass2),
        64 => SopranoSax,
        65 => AltoSax,
        66 => TenorSax,
        67 => BaritoneSax,
        68 => Oboe,
        71 => Clarinet,
        72 => Piccolo,
        73 => Flute,
        74 => Recorder,
        75 => PanFlute(PipeSkin::Wood),
        76 => BlownBottle,
        78 => Whistles,
        79 => Ocarina,
        // Square and saw leads are monophonic beams unless the part is
        // actually chordal.
        80 => {
            if max_polyphony(note_events) > SPACE_LASER_POLYPHONY_LIMIT {
                Keyboard(KeyboardVariant::Square)
            } else {
                SpaceLaser(SpaceLaserVariant::Square)
            }
        }
        81 => {
            if max_polyphony(note_events) > SPACE_LASER_POLYPHONY_LIMIT {
                Keyboard(KeyboardVariant::Saw)
            } else {
                SpaceLaser(SpaceLaserVariant::Saw)
            }
        }
        82 => PanFlute(PipeSkin::Gold),
        83 => Keyboard(KeyboardVariant::Chiff),
        84 => Keyboard(KeyboardVariant::Charang),
        85 => StageChoir(ChoirVariant::VoiceSynth),
        86 => FifthsKeyboard(KeyboardVariant::Synth),
        87 => Keyboard(KeyboardVariant::BassAndLead),
        88 => Keyboard(KeyboardVariant::NewAge),
        89 => Keyboard(KeyboardVariant::Warm),
        90 => Keyboard(KeyboardVariant::Polysynth),
        91 => Keyboard(KeyboardVariant::Choir),
        92 => StageStrings(StageStringsVariant::BowedSynth, StringBehavior::Normal),
        93 => Keyboard(KeyboardVariant::Metallic),
        94 => StageChoir(ChoirVariant::HaloSynth),
        95 => Keyboard(KeyboardVariant::Sweep),
        96 | 97 | 100 | 103 => Keyboard(KeyboardVariant::Synth),
        99 => Keyboard(KeyboardVariant::Atmosphere),
        101 => StageChoir(ChoirVariant::GoblinSynth),
        102 => Keyboard(KeyboardVariant::Echoes),
        105 => Banjo,
        106 => Shamisen,
        108 => Kalimba,
        109 => BagPipe,
        110 => Fiddle,
        112 => TinkleBell,
        113 => Agogos,
        114 => SteelDrums,
        115 => Woodblocks,
        116 => TaikoDrum,
        117 => MelodicTom,
        118 => SynthDrum,
        119 => ReverseCymbal,
        121 => StageChoir(ChoirVariant::SynthVoice),
        123 => BirdTweet,
        124 => TelephoneRing,
        125 => Helicopter,
        126 => ApplauseChoir,
        127 => Gunshot,
        _ => return None,
    })
}

fn bank_8_spec(program: u8) -> Option<InstrumentSpec> {
    use InstrumentSpec::*;

    Some(match program {
        0 => Keyboard(KeyboardVariant::Grand),
        1 => Keyboard(KeyboardVariant::BrightAcoustic),
        2 => Keyboard(KeyboardVariant::ElectricGrand),
        3 => Keyboard(KeyboardVariant::HonkyTonk),
        4 => Keyboard(KeyboardVariant::Electric1),
        5 => Keyboard(KeyboardVariant::Electric2),
        6 => Keyboard(KeyboardVariant::Harpsichord),
        11 => Mallets(MalletVariant::Vibraphone),
        12 => Mallets(MalletVariant::Marimba),
        14 => TubularBells,
        16 | 17 | 19 => Keyboard(KeyboardVariant::Wood),
        21 => Accordion,
        24 | 25 => Guitar(GuitarVariant::Acoustic),
        _ => return None,
    })
}
