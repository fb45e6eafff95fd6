//! Tick to wall-clock conversion.
//!
//! MIDI time is expressed in ticks; a tempo map converts ticks to seconds by
//! accumulating the time elapsed under each tempo segment. The map is built
//! once at load time and is read-only afterwards, so it can be shared by
//! reference across every collector.

/// Default tempo when a file carries no tempo events: 120 BPM.
pub const DEFAULT_US_PER_QUARTER: u32 = 500_000;

/// One tempo segment, starting at `tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TempoChange {
    tick: u64,
    us_per_quarter: u32,
    /// Wall-clock time at which this segment begins.
    seconds: f64,
}

/// Converts MIDI ticks to seconds.
#[derive(Debug, Clone)]
pub struct TempoMap {
    /// Pulses per quarter note from the file header.
    division: u16,
    /// Tempo segments, sorted by tick, first always at tick 0.
    changes: Vec<TempoChange>,
}

impl TempoMap {
    /// Builds a tempo map from `(tick, microseconds per quarter note)` pairs.
    ///
    /// The pairs need not be sorted. When several tempos share a tick, the
    /// last one wins. A file with no tempo events gets the MIDI default of
    /// 120 BPM.
    pub fn new(division: u16, tempo_events: impl IntoIterator<Item = (u64, u32)>) -> Self {
        let mut raw: Vec<(u64, u32)> = tempo_events.into_iter().collect();
        raw.sort_by_key(|&(tick, _)| tick);

        // Same-tick duplicates: keep the last.
        let mut deduped: Vec<(u64, u32)> = Vec::with_capacity(raw.len());
        for (tick, tempo) in raw {
            match deduped.last_mut() {
                Some(last) if last.0 == tick => last.1 = tempo,
                _ => deduped.push((tick, tempo)),
            }
        }

        if deduped.first().map_or(true, |&(tick, _)| tick > 0) {
            deduped.insert(0, (0, DEFAULT_US_PER_QUARTER));
        }

        // Accumulate the wall-clock start of each segment.
        let division_f = division as f64;
        let mut changes = Vec::with_capacity(deduped.len());
        let mut seconds = 0.0;
        let mut prev: Option<(u64, u32)> = None;
        for (tick, tempo) in deduped {
            if let Some((prev_tick, prev_tempo)) = prev {
                let beats = (tick - prev_tick) as f64 / division_f;
                seconds += beats * prev_tempo as f64 / 1_000_000.0;
            }
            changes.push(TempoChange {
                tick,
                us_per_quarter: tempo,
                seconds,
            });
            prev = Some((tick, tempo));
        }

        Self { division, changes }
    }

    /// Pulses per quarter note.
    pub fn division(&self) -> u16 {
        self.division
    }

    /// Converts a tick to seconds.
    pub fn tick_to_seconds(&self, tick: u64) -> f64 {
        let index = self
            .changes
            .partition_point(|change| change.tick <= tick)
            .saturating_sub(1);
        let change = &self.changes[index];
        let beats = (tick - change.tick) as f64 / self.division as f64;
        change.seconds + beats * change.us_per_quarter as f64 / 1_000_000.0
    }

    /// The tempo in effect at `tick`, in microseconds per quarter note.
    pub fn tempo_at(&self, tick: u64) -> u32 {
        let index = self
            .changes
            .partition_point(|change| change.tick <= tick)
            .saturating_sub(1);
        self.changes[index].us_per_quarter
    }
}

impl Default for TempoMap {
    /// A map at 120 BPM with the common 480 PPQ resolution.
    fn default() -> Self {
        Self::new(480, [])
    }
}
