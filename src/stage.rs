//! The stage: every instrument for one playback session.

use crate::assign;
use crate::instrument::Instrument;
use crate::midi::{MidiEvent, Sequence, TempoMap};

/// Owns the assigned instruments and drives them frame by frame.
#[derive(Debug, Clone)]
pub struct Stage {
    instruments: Vec<Instrument>,
    duration: f64,
}

impl Stage {
    /// Assigns instruments for a loaded sequence. Construction does all the
    /// heavy lifting once; `on_progress` reports fractional completion.
    pub fn new(sequence: &Sequence, on_progress: impl FnMut(f32)) -> Self {
        Self::from_events(&sequence.tracks, &sequence.tempo, on_progress)
    }

    /// Assigns instruments from raw per-track event lists.
    pub fn from_events(
        tracks: &[Vec<MidiEvent>],
        tempo: &TempoMap,
        on_progress: impl FnMut(f32),
    ) -> Self {
        let instruments = assign::assign(tracks, tempo, on_progress);
        let duration = instruments
            .iter()
            .map(Instrument::end_time)
            .fold(0.0, f64::max);
        Self {
            instruments,
            duration,
        }
    }

    /// Advances every instrument one frame.
    pub fn tick(&mut self, time: f64, delta: f64) {
        for instrument in &mut self.instruments {
            instrument.tick(time, delta);
        }
    }

    /// Moves every instrument to an arbitrary transport position. Call before
    /// the next tick after a jump.
    pub fn seek(&mut self, time: f64) {
        for instrument in &mut self.instruments {
            instrument.seek(time);
        }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Seconds from the start of the song to the end of the last cue.
    pub fn duration(&self) -> f64 {
        self.duration
    }
}
