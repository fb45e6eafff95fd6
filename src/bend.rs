//! Pitch-bend and modulation smoothing.
//!
//! Combines three sticky event streams into one semitone offset per frame:
//! the composite pitch-bend value, the modulation wheel (CC 1), and the RPN
//! modulation depth range. Vibrato is a fixed-frequency sine LFO whose
//! amplitude scales with wheel position and configured depth; its phase
//! resets at note onset so the wobble always starts from zero.

use crate::collector::EventCollector;
use crate::midi::event::CC_MODULATION_WHEEL;
use crate::midi::virt::{
    composite_bend_events, modulation_depth_range_events, CompositeBendEvent,
    ModulationDepthRangeEvent, DEFAULT_MODULATION_DEPTH_RANGE,
};
use crate::midi::{MidiEvent, TempoMap};
use crate::util::NumberSmoother;

/// Default smoothing constant. Tuned for visually plausible glide; not
/// derived from the MIDI spec.
pub const DEFAULT_SMOOTHNESS: f64 = 10.0;

/// Vibrato LFO rate constant. Tuned empirically alongside the smoothness.
const LFO_RATE: f64 = 50.0;

/// Computes a smoothed semitone offset from pitch-bend and modulation events.
#[derive(Debug, Clone)]
pub struct PitchBendModulationController {
    bend_collector: EventCollector<CompositeBendEvent>,
    modulation_collector: EventCollector<MidiEvent>,
    depth_collector: EventCollector<ModulationDepthRangeEvent>,

    // Sticky MIDI state.
    pitch_bend: f64,
    modulation: u8,
    modulation_range: f64,

    // Animation state.
    phase: f64,
    smoother: NumberSmoother,
}

impl PitchBendModulationController {
    /// Builds a controller from an instrument's event list. The list should
    /// include every control change seen on the channel, since bend and RPN
    /// state persist across program switches.
    pub fn new(events: &[MidiEvent], tempo: &TempoMap) -> Self {
        Self::with_smoothness(events, tempo, DEFAULT_SMOOTHNESS)
    }

    /// Like [`PitchBendModulationController::new`] with a custom smoothness.
    pub fn with_smoothness(events: &[MidiEvent], tempo: &TempoMap, smoothness: f64) -> Self {
        let wheel_events = events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    MidiEvent::ControlChange {
                        controller: CC_MODULATION_WHEEL,
                        ..
                    }
                )
            })
            .copied()
            .collect();

        Self {
            bend_collector: EventCollector::new(composite_bend_events(events), tempo),
            modulation_collector: EventCollector::new(wheel_events, tempo),
            depth_collector: EventCollector::new(modulation_depth_range_events(events), tempo),
            pitch_bend: 0.0,
            modulation: 0,
            modulation_range: DEFAULT_MODULATION_DEPTH_RANGE,
            phase: 0.0,
            smoother: NumberSmoother::new(0.0, smoothness),
        }
    }

    /// The current smoothed bend, in semitones.
    pub fn bend(&self) -> f32 {
        self.smoother.value()
    }

    /// Advances the controller one frame and returns the semitone offset to
    /// apply to the instrument's bend visual.
    ///
    /// When `is_new_note` is set, the output snaps to the raw bend value so a
    /// note never begins mid-glide. When the instrument is idle and
    /// `apply_modulation_when_idling` is false, vibrato is left out of the
    /// target.
    pub fn tick(
        &mut self,
        time: f64,
        delta: f64,
        apply_modulation_when_idling: bool,
        is_new_note: bool,
        playing: impl FnOnce() -> bool,
    ) -> f32 {
        self.phase += delta;

        if let Some(event) = self.bend_collector.advance_collect_one(time) {
            self.pitch_bend = event.bend;
        }
        if let Some(MidiEvent::ControlChange { value, .. }) =
            self.modulation_collector.advance_collect_one(time)
        {
            self.modulation = *value;
        }
        if let Some(event) = self.depth_collector.advance_collect_one(time) {
            self.modulation_range = event.value;
        }

        if is_new_note {
            self.smoother.snap(self.pitch_bend as f32);
        }

        let target = if !playing() && !apply_modulation_when_idling {
            self.pitch_bend
        } else {
            self.pitch_bend + self.modulation_semitones()
        };
        self.smoother.tick(delta, target as f32)
    }

    /// Resets the vibrato phase. Call when a new note begins so the LFO
    /// starts from zero relative to note onset.
    pub fn reset_modulation(&mut self) {
        self.phase = 0.0;
    }

    /// The composite bend in effect at `tick`, ignoring smoothing.
    pub fn bend_at_tick(&self, tick: u64) -> f64 {
        self.bend_collector
            .items()
            .iter()
            .rev()
            .find(|event| event.tick <= tick)
            .map_or(0.0, |event| event.bend)
    }

    /// Jumps the three sticky states to an arbitrary transport position.
    pub fn seek(&mut self, time: f64) {
        self.bend_collector.seek(time);
        self.pitch_bend = self.bend_collector.prev().map_or(0.0, |event| event.bend);

        self.modulation_collector.seek(time);
        self.modulation = match self.modulation_collector.prev() {
            Some(MidiEvent::ControlChange { value, .. }) => *value,
            _ => 0,
        };

        self.depth_collector.seek(time);
        self.modulation_range = self
            .depth_collector
            .prev()
            .map_or(DEFAULT_MODULATION_DEPTH_RANGE, |event| event.value);
    }

    fn modulation_semitones(&self) -> f64 {
        (LFO_RATE * self.phase).sin() * self.modulation_range * (self.modulation as f64 / 128.0)
    }
}
