//! Instrument visibility.
//!
//! An instrument on the stage should appear slightly before it is needed,
//! stay put through short rests, and fade out gracefully after its last note
//! rather than vanishing. Three independent time windows control this; the
//! rules below are checked in precedence order and the first match wins:
//!
//! 1. an arc is sounding right now,
//! 2. the next hit is within `show_before`,
//! 3. the gap between the previous and next hit is within `show_between`,
//! 4. the previous hit was within `show_after`.
//!
//! Otherwise the instrument is invisible.

use crate::collector::{EventCollector, TimedArcCollector};

/// Time windows for the visibility rules, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Parameters {
    /// How long before its next hit an instrument appears.
    pub show_before: f64,
    /// The longest silent gap an instrument stays visible through.
    pub show_between: f64,
    /// How long after its last hit an instrument lingers.
    pub show_after: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            show_before: 1.0,
            show_between: 7.0,
            show_after: 2.0,
        }
    }
}

/// Visibility for instruments cued by discrete events (percussion hits).
pub fn events_rule<T>(collector: &EventCollector<T>, time: f64, parameters: &Parameters) -> bool {
    if let Some(next) = collector.peek_time() {
        if next - time <= parameters.show_before {
            return true;
        }
    }

    if let (Some(prev), Some(next)) = (collector.prev_time(), collector.peek_time()) {
        if next - prev <= parameters.show_between {
            return true;
        }
    }

    if let Some(prev) = collector.prev_time() {
        if time - prev <= parameters.show_after {
            return true;
        }
    }

    false
}

/// Visibility for instruments cued by note arcs (sustained instruments).
pub fn arcs_rule(collector: &TimedArcCollector, time: f64, parameters: &Parameters) -> bool {
    if !collector.current_arcs().is_empty() {
        return true;
    }

    if let Some(next) = collector.peek() {
        if next.start - time <= parameters.show_before {
            return true;
        }
    }

    if let (Some(prev), Some(next)) = (collector.prev(), collector.peek()) {
        if next.start - prev.end <= parameters.show_between {
            return true;
        }
    }

    if let Some(prev) = collector.prev() {
        if time - prev.end <= parameters.show_after {
            return true;
        }
    }

    false
}
