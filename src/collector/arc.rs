//! Cursor-based collection of note arcs.
//!
//! Arcs are intervals rather than instants, so on top of the usual cursor
//! the collector maintains the set of arcs currently sounding at the query
//! time. That set is what lets a visually monophonic instrument still know
//! about every overlapping note.

use crate::midi::TimedArc;

/// Collects note arcs as playback passes over their start times.
#[derive(Debug, Clone)]
pub struct TimedArcCollector {
    /// All arcs, sorted by start time.
    arcs: Vec<TimedArc>,
    /// Index of the next arc to begin.
    index: usize,
    /// Arcs whose interval contains the last queried time.
    current: Vec<TimedArc>,
    last_advance: f64,
}

impl TimedArcCollector {
    /// Creates a collector over `arcs`, which must be sorted by start time.
    pub fn new(arcs: Vec<TimedArc>) -> Self {
        Self {
            arcs,
            index: 0,
            current: Vec::new(),
            last_advance: f64::NEG_INFINITY,
        }
    }

    /// Advances the play head, returning arcs that began since the last
    /// advance or seek, and refreshing the currently-sounding set.
    ///
    /// The time argument must be non-decreasing between seeks.
    pub fn advance(&mut self, time: f64) -> &[TimedArc] {
        debug_assert!(
            time >= self.last_advance,
            "advance time went backwards; use seek() for transport jumps"
        );
        self.last_advance = time;

        let start = self.index;
        while self.index < self.arcs.len() && self.arcs[self.index].start <= time {
            self.current.push(self.arcs[self.index]);
            self.index += 1;
        }
        // Half-open intervals: an arc ending exactly now is no longer sounding.
        self.current.retain(|arc| arc.end > time);

        &self.arcs[start..self.index]
    }

    /// Moves the play head to an arbitrary position, recomputing both the
    /// cursor and the currently-sounding set.
    pub fn seek(&mut self, time: f64) {
        self.index = self.arcs.partition_point(|arc| arc.start <= time);
        self.current = self.arcs[..self.index]
            .iter()
            .filter(|arc| arc.end > time)
            .copied()
            .collect();
        self.last_advance = f64::NEG_INFINITY;
    }

    /// Arcs whose interval contains the last queried time.
    pub fn current_arcs(&self) -> &[TimedArc] {
        &self.current
    }

    /// The next arc yet to begin, if any.
    pub fn peek(&self) -> Option<&TimedArc> {
        self.arcs.get(self.index)
    }

    /// The most recently begun arc, if any has begun.
    pub fn prev(&self) -> Option<&TimedArc> {
        self.index.checked_sub(1).and_then(|i| self.arcs.get(i))
    }

    /// The whole arc pool, sorted by start time.
    pub fn arcs(&self) -> &[TimedArc] {
        &self.arcs
    }

    /// Total number of arcs in the pool.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc(start: f64, end: f64, note: u8) -> TimedArc {
        TimedArc {
            note,
            velocity: 100,
            start_tick: (start * 960.0) as u64,
            end_tick: (end * 960.0) as u64,
            start,
            end,
        }
    }

    #[test]
    fn test_advance_returns_newly_started() {
        let mut c = TimedArcCollector::new(vec![arc(0.0, 1.0, 60), arc(0.5, 2.0, 64)]);

        let started = c.advance(0.0);
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].note, 60);

        let started = c.advance(0.6);
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].note, 64);

        assert!(c.advance(0.7).is_empty());
    }

    #[test]
    fn test_current_arcs_tracks_overlap() {
        let mut c = TimedArcCollector::new(vec![arc(0.0, 1.0, 60), arc(0.5, 2.0, 64)]);

        c.advance(0.6);
        assert_eq!(c.current_arcs().len(), 2);

        c.advance(1.5);
        assert_eq!(c.current_arcs().len(), 1);
        assert_eq!(c.current_arcs()[0].note, 64);

        c.advance(2.5);
        assert!(c.current_arcs().is_empty());
    }

    #[test]
    fn test_arc_ending_now_is_not_current() {
        let mut c = TimedArcCollector::new(vec![arc(0.0, 1.0, 60)]);
        c.advance(1.0);
        assert!(c.current_arcs().is_empty());
    }

    #[test]
    fn test_peek_and_prev() {
        let mut c = TimedArcCollector::new(vec![arc(0.0, 1.0, 60), arc(2.0, 3.0, 64)]);
        assert_eq!(c.peek().unwrap().note, 60);
        assert!(c.prev().is_none());

        c.advance(0.5);
        assert_eq!(c.peek().unwrap().note, 64);
        assert_eq!(c.prev().unwrap().note, 60);
    }

    #[test]
    fn test_seek_restores_current_set() {
        let mut c = TimedArcCollector::new(vec![
            arc(0.0, 1.0, 60),
            arc(0.5, 2.0, 64),
            arc(3.0, 4.0, 67),
        ]);
        c.advance(3.5);
        c.seek(0.75);

        assert_eq!(c.current_arcs().len(), 2);
        assert_eq!(c.peek().unwrap().note, 67);
        assert_eq!(c.prev().unwrap().note, 64);
    }

    #[test]
    fn test_seek_matches_fresh_advance() {
        let arcs = vec![arc(0.0, 1.0, 60), arc(2.0, 3.0, 64)];
        let mut seeked = TimedArcCollector::new(arcs.clone());
        seeked.advance(5.0);
        seeked.seek(2.5);

        let mut fresh = TimedArcCollector::new(arcs);
        fresh.advance(2.5);

        assert_eq!(seeked.current_arcs(), fresh.current_arcs());
        assert_eq!(seeked.peek(), fresh.peek());
        assert_eq!(seeked.prev(), fresh.prev());
    }
}
