//! One instrument on the stage.
//!
//! An [`Instrument`] is a single animation unit: it owns the collectors that
//! cue it, tracks its own visibility, and, for melodic units, carries the
//! pitch-bend controller. Sustained instruments are cued by note arcs;
//! percussion units are cued by discrete hits.

use crate::assign::patch::InstrumentSpec;
use crate::assign::percussion::{AuxiliaryVoice, DrumKitVariant, PercussionSpec};
use crate::bend::PitchBendModulationController;
use crate::collector::{EventCollector, TimedArcCollector};
use crate::midi::{build_arcs, MidiEvent, TempoMap, TimedArc};
use crate::visibility::{self, Parameters};

/// What an instrument portrays on stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// A melodic patch from the General MIDI dispatch table.
    Melodic(InstrumentSpec),
    /// A drum kit on the rhythm channel.
    Kit(DrumKitVariant),
    /// A melodic stand-in hiding inside a kit program.
    Special(PercussionSpec),
    /// A single-voice percussion unit.
    Auxiliary(AuxiliaryVoice),
}

#[derive(Debug, Clone)]
enum Cueing {
    Arcs {
        collector: TimedArcCollector,
        bend: PitchBendModulationController,
        recent: Vec<TimedArc>,
    },
    Hits {
        collector: EventCollector<MidiEvent>,
        recent: Vec<MidiEvent>,
    },
}

/// A single animation unit and its cueing state.
#[derive(Debug, Clone)]
pub struct Instrument {
    role: Role,
    channel: u8,
    cueing: Cueing,
    parameters: Parameters,
    visible: bool,
    bend: f32,
}

impl Instrument {
    /// Builds an arc-cued instrument from its bin's events. Note pairs become
    /// arcs; the full event list feeds the pitch-bend controller so sticky
    /// controller state is honored.
    pub fn from_arcs(role: Role, channel: u8, events: &[MidiEvent], tempo: &TempoMap) -> Self {
        let arcs = build_arcs(events, tempo);
        Self {
            role,
            channel,
            cueing: Cueing::Arcs {
                collector: TimedArcCollector::new(arcs),
                bend: PitchBendModulationController::new(events, tempo),
                recent: Vec::new(),
            },
            parameters: Parameters::default(),
            visible: false,
            bend: 0.0,
        }
    }

    /// Builds a hit-cued instrument from a list of note-on events.
    pub fn from_hits(role: Role, channel: u8, hits: Vec<MidiEvent>, tempo: &TempoMap) -> Self {
        Self {
            role,
            channel,
            cueing: Cueing::Hits {
                collector: EventCollector::new(hits, tempo),
                recent: Vec::new(),
            },
            parameters: Parameters::default(),
            visible: false,
            bend: 0.0,
        }
    }

    /// Overrides the default visibility windows.
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Whether the instrument should currently be on stage.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The smoothed pitch-bend offset in semitones, zero for hit-cued units.
    pub fn bend(&self) -> f32 {
        self.bend
    }

    /// Arcs sounding at the last ticked time. Empty for hit-cued units.
    pub fn current_arcs(&self) -> &[TimedArc] {
        match &self.cueing {
            Cueing::Arcs { collector, .. } => collector.current_arcs(),
            Cueing::Hits { .. } => &[],
        }
    }

    /// Arcs that began, or hits that landed, during the last tick.
    pub fn recent_arcs(&self) -> &[TimedArc] {
        match &self.cueing {
            Cueing::Arcs { recent, .. } => recent,
            Cueing::Hits { .. } => &[],
        }
    }

    /// Hits that landed during the last tick. Empty for arc-cued units.
    pub fn recent_hits(&self) -> &[MidiEvent] {
        match &self.cueing {
            Cueing::Hits { recent, .. } => recent,
            Cueing::Arcs { .. } => &[],
        }
    }

    /// The next hit yet to land, for anticipatory animation.
    pub fn peek_hit(&self) -> Option<&MidiEvent> {
        match &self.cueing {
            Cueing::Hits { collector, .. } => collector.peek(),
            Cueing::Arcs { .. } => None,
        }
    }

    /// The most recent hit, if any has landed.
    pub fn prev_hit(&self) -> Option<&MidiEvent> {
        match &self.cueing {
            Cueing::Hits { collector, .. } => collector.prev(),
            Cueing::Arcs { .. } => None,
        }
    }

    /// Advances the instrument one frame.
    pub fn tick(&mut self, time: f64, delta: f64) {
        match &mut self.cueing {
            Cueing::Arcs {
                collector,
                bend,
                recent,
            } => {
                recent.clear();
                recent.extend_from_slice(collector.advance(time));

                let is_new_note = !recent.is_empty();
                if is_new_note {
                    bend.reset_modulation();
                }
                let playing = !collector.current_arcs().is_empty();
                self.bend = bend.tick(time, delta, false, is_new_note, || playing);

                self.visible = visibility::arcs_rule(collector, time, &self.parameters);
            }
            Cueing::Hits { collector, recent } => {
                recent.clear();
                let collected = collector.advance_collect_all(time);
                recent.extend_from_slice(collected);

                self.visible = visibility::events_rule(collector, time, &self.parameters);
            }
        }
    }

    /// Moves the instrument to an arbitrary transport position.
    pub fn seek(&mut self, time: f64) {
        match &mut self.cueing {
            Cueing::Arcs {
                collector,
                bend,
                recent,
            } => {
                collector.seek(time);
                bend.seek(time);
                recent.clear();
            }
            Cueing::Hits { collector, recent } => {
                collector.seek(time);
                recent.clear();
            }
        }
    }

    /// The end time of the instrument's last cue, in seconds.
    pub fn end_time(&self) -> f64 {
        match &self.cueing {
            Cueing::Arcs { collector, .. } => collector
                .arcs()
                .iter()
                .map(|arc| arc.end)
                .fold(0.0, f64::max),
            Cueing::Hits { collector, .. } => collector.last_time().unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 480 PPQ at 120 BPM: one second = 960 ticks.
    fn melodic_events() -> Vec<MidiEvent> {
        vec![
            MidiEvent::NoteOn {
                tick: 0,
                channel: 0,
                note: 60,
                velocity: 100,
            },
            MidiEvent::NoteOff {
                tick: 960,
                channel: 0,
                note: 60,
            },
            MidiEvent::NoteOn {
                tick: 1920,
                channel: 0,
                note: 64,
                velocity: 90,
            },
            MidiEvent::NoteOff {
                tick: 2880,
                channel: 0,
                note: 64,
            },
        ]
    }

    fn melodic() -> Instrument {
        let tempo = TempoMap::default();
        Instrument::from_arcs(
            Role::Melodic(InstrumentSpec::Trombone),
            0,
            &melodic_events(),
            &tempo,
        )
    }

    #[test]
    fn test_arc_instrument_cues_and_visibility() {
        let mut instrument = melodic();

        instrument.tick(0.0, 0.016);
        assert_eq!(instrument.recent_arcs().len(), 1);
        assert_eq!(instrument.current_arcs().len(), 1);
        assert!(instrument.is_visible());

        instrument.tick(1.5, 0.016);
        assert!(instrument.recent_arcs().is_empty());
        assert!(instrument.current_arcs().is_empty());
        // Still visible: the next arc starts within the show-before window.
        assert!(instrument.is_visible());
    }

    #[test]
    fn test_hit_instrument_cues() {
        let tempo = TempoMap::default();
        let hits = vec![MidiEvent::NoteOn {
            tick: 960,
            channel: 9,
            note: 56,
            velocity: 100,
        }];
        let mut cowbell = Instrument::from_hits(
            Role::Auxiliary(AuxiliaryVoice::Cowbell),
            9,
            hits,
            &tempo,
        );

        cowbell.tick(0.5, 0.016);
        assert!(cowbell.recent_hits().is_empty());
        assert!(cowbell.is_visible());
        assert_eq!(cowbell.peek_hit().map(|e| e.tick()), Some(960));

        cowbell.tick(1.0, 0.016);
        assert_eq!(cowbell.recent_hits().len(), 1);
        assert_eq!(cowbell.prev_hit().map(|e| e.tick()), Some(960));
    }

    #[test]
    fn test_seek_then_tick() {
        let mut instrument = melodic();
        instrument.tick(5.0, 0.016);

        instrument.seek(0.0);
        instrument.tick(0.0, 0.016);
        assert_eq!(instrument.recent_arcs().len(), 1);
    }

    #[test]
    fn test_end_time() {
        let instrument = melodic();
        assert!((instrument.end_time() - 3.0).abs() < 1e-9);
    }
}
