//! Cursor-based collection of elapsed events.
//!
//! An [`EventCollector`] walks a time-sorted event list once per frame,
//! handing back whatever elapsed since the previous call. Forward playback is
//! an amortized O(1) index bump per frame; scrubbing the transport goes
//! through [`EventCollector::seek`], which re-derives the cursor by binary
//! search instead.

use crate::midi::TempoMap;

use super::Ticked;

/// Collects elapsed events from a pool, in time order, exactly once each.
#[derive(Debug, Clone)]
pub struct EventCollector<T> {
    items: Vec<T>,
    /// Wall-clock time of each item, parallel to `items`.
    times: Vec<f64>,
    index: usize,
    /// Last time passed to an advance call, for the monotonicity contract.
    last_advance: f64,
}

impl<T: Ticked> EventCollector<T> {
    /// Creates a collector over `items`, which must be sorted by tick.
    pub fn new(items: Vec<T>, tempo: &TempoMap) -> Self {
        let times = items
            .iter()
            .map(|item| tempo.tick_to_seconds(item.tick()))
            .collect();
        Self {
            items,
            times,
            index: 0,
            last_advance: f64::NEG_INFINITY,
        }
    }
}

impl<T> EventCollector<T> {
    /// Advances the play head and returns every event that has elapsed since
    /// the last advance or seek, in time order.
    ///
    /// Repeated calls at the same time return an empty slice. The time
    /// argument must be non-decreasing between seeks; going backwards without
    /// a seek is a caller bug.
    pub fn advance_collect_all(&mut self, time: f64) -> &[T] {
        debug_assert!(
            time >= self.last_advance,
            "advance time went backwards; use seek() for transport jumps"
        );
        self.last_advance = time;

        let start = self.index;
        while self.index < self.items.len() && self.times[self.index] <= time {
            self.index += 1;
        }
        &self.items[start..self.index]
    }

    /// Advances the play head and returns only the most recent elapsed event,
    /// or `None` if nothing elapsed since the last call.
    pub fn advance_collect_one(&mut self, time: f64) -> Option<&T> {
        let collected = self.advance_collect_all(time);
        collected.last()
    }

    /// Moves the play head to an arbitrary position in the song.
    ///
    /// Not for per-frame use; call this when the transport jumps. The
    /// resulting cursor matches a freshly constructed collector advanced
    /// monotonically to `time`.
    pub fn seek(&mut self, time: f64) {
        self.index = self.times.partition_point(|&t| t <= time);
        self.last_advance = f64::NEG_INFINITY;
    }

    /// The immediate next event in the future, if any.
    pub fn peek(&self) -> Option<&T> {
        self.items.get(self.index)
    }

    /// The wall-clock time of the next event.
    pub fn peek_time(&self) -> Option<f64> {
        self.times.get(self.index).copied()
    }

    /// The most recently elapsed event, if any has elapsed.
    pub fn prev(&self) -> Option<&T> {
        self.index.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// The wall-clock time of the most recently elapsed event.
    pub fn prev_time(&self) -> Option<f64> {
        self.index.checked_sub(1).and_then(|i| self.times.get(i)).copied()
    }

    /// The whole event pool, in time order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The wall-clock time of the final event, if any.
    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Total number of events in the pool.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::MidiEvent;

    // 480 PPQ at 120 BPM: 960 ticks per second.
    fn collector(ticks: &[u64]) -> EventCollector<MidiEvent> {
        let tempo = TempoMap::default();
        let events = ticks
            .iter()
            .map(|&tick| MidiEvent::NoteOn {
                tick,
                channel: 0,
                note: 60,
                velocity: 100,
            })
            .collect();
        EventCollector::new(events, &tempo)
    }

    #[test]
    fn test_advance_returns_each_item_once() {
        let mut c = collector(&[0, 480, 960, 1440]);

        assert_eq!(c.advance_collect_all(0.0).len(), 1);
        assert_eq!(c.advance_collect_all(0.25).len(), 0);
        assert_eq!(c.advance_collect_all(1.0).len(), 2);
        assert_eq!(c.advance_collect_all(10.0).len(), 1);
        assert_eq!(c.advance_collect_all(11.0).len(), 0);
    }

    #[test]
    fn test_advance_is_idempotent_at_same_time() {
        let mut c = collector(&[0, 480]);
        assert_eq!(c.advance_collect_all(0.5).len(), 2);
        assert!(c.advance_collect_all(0.5).is_empty());
    }

    #[test]
    fn test_collect_one_returns_latest() {
        let mut c = collector(&[0, 480, 960]);
        let latest = c.advance_collect_one(1.0).unwrap();
        assert_eq!(crate::collector::Ticked::tick(latest), 960);
        assert!(c.advance_collect_one(1.0).is_none());
    }

    #[test]
    fn test_peek_and_prev_straddle_cursor() {
        let mut c = collector(&[0, 480]);
        assert!(c.prev().is_none());
        assert_eq!(c.peek_time(), Some(0.0));

        c.advance_collect_all(0.1);
        assert_eq!(c.prev_time(), Some(0.0));
        assert_eq!(c.peek_time(), Some(0.5));

        c.advance_collect_all(1.0);
        assert_eq!(c.prev_time(), Some(0.5));
        assert!(c.peek().is_none());
    }

    #[test]
    fn test_seek_matches_fresh_advance() {
        let mut seeked = collector(&[0, 480, 960, 1440]);
        seeked.advance_collect_all(2.0);
        seeked.seek(0.5);

        let mut fresh = collector(&[0, 480, 960, 1440]);
        fresh.advance_collect_all(0.5);

        assert_eq!(seeked.peek_time(), fresh.peek_time());
        assert_eq!(seeked.prev_time(), fresh.prev_time());
        // Nothing new at the seek target itself.
        assert!(seeked.advance_collect_all(0.5).is_empty());
    }

    #[test]
    fn test_seek_past_end() {
        let mut c = collector(&[0, 480]);
        c.seek(100.0);
        assert!(c.peek().is_none());
        assert_eq!(c.prev_time(), Some(0.5));
    }

    #[test]
    fn test_seek_to_start_replays_everything() {
        let mut c = collector(&[0, 480]);
        c.advance_collect_all(1.0);
        c.seek(-0.001);
        assert_eq!(c.advance_collect_all(1.0).len(), 2);
    }
}
