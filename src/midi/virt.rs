//! Virtual composite events.
//!
//! Some animation signals have no single MIDI message behind them. The true
//! semitone offset of the pitch wheel is the raw wheel position scaled by the
//! RPN-configured bend sensitivity, and the vibrato depth comes from the RPN
//! modulation depth range. These functions resolve the multi-message RPN
//! protocol (CC 101/100 select a parameter, CC 6/38 write its value) into
//! flat, tick-stamped event lists that collectors can iterate like any other.
//!
//! Virtual events are synthesized once at instrument construction time.

use super::event::MidiEvent;

const CC_DATA_ENTRY_MSB: u8 = 6;
const CC_DATA_ENTRY_LSB: u8 = 38;
const CC_NRPN_LSB: u8 = 98;
const CC_NRPN_MSB: u8 = 99;
const CC_RPN_LSB: u8 = 100;
const CC_RPN_MSB: u8 = 101;

/// RPN 0x0000: pitch bend sensitivity.
const RPN_PITCH_BEND_SENSITIVITY: (u8, u8) = (0, 0);
/// RPN 0x0005: modulation depth range.
const RPN_MODULATION_DEPTH_RANGE: (u8, u8) = (0, 5);

/// Default pitch bend sensitivity: +/- 2 semitones.
const DEFAULT_BEND_SEMITONES: f64 = 2.0;

/// Default modulation depth range: 50 cents.
pub const DEFAULT_MODULATION_DEPTH_RANGE: f64 = 0.5;

/// The pitch wheel state combined with the configured bend range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeBendEvent {
    pub tick: u64,
    /// Offset in semitones.
    pub bend: f64,
}

/// A resolved RPN modulation depth range write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationDepthRangeEvent {
    pub tick: u64,
    /// Vibrato depth in semitones.
    pub value: f64,
}

/// Tracks which parameter number is currently addressed by data entry.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Selection {
    None,
    Registered(u8, u8),
    NonRegistered,
}

#[derive(Debug)]
struct RpnState {
    selection: Selection,
    rpn_msb: u8,
    rpn_lsb: u8,
}

impl RpnState {
    fn new() -> Self {
        Self {
            selection: Selection::None,
            rpn_msb: 127,
            rpn_lsb: 127,
        }
    }

    /// Feeds a control change; returns `true` when the event was an RPN/NRPN
    /// address change (consumed by the state machine).
    fn observe(&mut self, controller: u8, value: u8) -> bool {
        match controller {
            CC_RPN_MSB => {
                self.rpn_msb = value;
                self.update_registered();
                true
            }
            CC_RPN_LSB => {
                self.rpn_lsb = value;
                self.update_registered();
                true
            }
            // NRPN selection shadows any registered parameter.
            CC_NRPN_MSB | CC_NRPN_LSB => {
                self.selection = Selection::NonRegistered;
                true
            }
            _ => false,
        }
    }

    fn update_registered(&mut self) {
        // (127, 127) is RPN NULL: deselects everything.
        self.selection = if self.rpn_msb == 127 && self.rpn_lsb == 127 {
            Selection::None
        } else {
            Selection::Registered(self.rpn_msb, self.rpn_lsb)
        };
    }

    fn selected(&self, rpn: (u8, u8)) -> bool {
        self.selection == Selection::Registered(rpn.0, rpn.1)
    }
}

/// Synthesizes composite pitch-bend events from raw wheel moves and bend
/// sensitivity writes.
///
/// A new event is emitted whenever either input changes, so the event stream
/// always carries the effective semitone offset.
pub fn composite_bend_events(events: &[MidiEvent]) -> Vec<CompositeBendEvent> {
    let mut state = RpnState::new();
    let mut semitones = DEFAULT_BEND_SEMITONES;
    let mut cents = 0.0;
    let mut wheel = 0.0; // normalized -1.0..1.0
    let mut out = Vec::new();

    for event in events {
        match *event {
            MidiEvent::PitchBend { tick, value, .. } => {
                wheel = (value as f64 - 8192.0) / 8192.0;
                out.push(CompositeBendEvent {
                    tick,
                    bend: wheel * (semitones + cents / 100.0),
                });
            }
            MidiEvent::ControlChange {
                tick,
                controller,
                value,
                ..
            } => {
                if state.observe(controller, value) {
                    continue;
                }
                if !state.selected(RPN_PITCH_BEND_SENSITIVITY) {
                    continue;
                }
                match controller {
                    CC_DATA_ENTRY_MSB => semitones = value as f64,
                    CC_DATA_ENTRY_LSB => cents = value as f64,
                    _ => continue,
                }
                out.push(CompositeBendEvent {
                    tick,
                    bend: wheel * (semitones + cents / 100.0),
                });
            }
            _ => {}
        }
    }

    out
}

/// Synthesizes resolved modulation depth range events from RPN 0x0005 writes.
pub fn modulation_depth_range_events(events: &[MidiEvent]) -> Vec<ModulationDepthRangeEvent> {
    let mut state = RpnState::new();
    let mut msb = 0.0;
    let mut lsb = 0.0;
    let mut out = Vec::new();

    for event in events {
        if let MidiEvent::ControlChange {
            tick,
            controller,
            value,
            ..
        } = *event
        {
            if state.observe(controller, value) {
                continue;
            }
            if !state.selected(RPN_MODULATION_DEPTH_RANGE) {
                continue;
            }
            match controller {
                CC_DATA_ENTRY_MSB => msb = value as f64,
                CC_DATA_ENTRY_LSB => lsb = value as f64,
                _ => continue,
            }
            // MSB is whole semitones; each LSB step is 100/128 cents.
            out.push(ModulationDepthRangeEvent {
                tick,
                value: msb + lsb / 128.0,
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cc(tick: u64, controller: u8, value: u8) -> MidiEvent {
        MidiEvent::ControlChange {
            tick,
            channel: 0,
            controller,
            value,
        }
    }

    fn bend(tick: u64, value: u16) -> MidiEvent {
        MidiEvent::PitchBend {
            tick,
            channel: 0,
            value,
        }
    }

    #[test]
    fn test_default_sensitivity_is_two_semitones() {
        let events = vec![bend(0, 16383)];
        let out = composite_bend_events(&events);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].bend, (16383.0 - 8192.0) / 8192.0 * 2.0);
    }

    #[test]
    fn test_sensitivity_rpn_scales_bend() {
        let events = vec![
            cc(0, CC_RPN_MSB, 0),
            cc(0, CC_RPN_LSB, 0),
            cc(0, CC_DATA_ENTRY_MSB, 12),
            bend(10, 16383),
        ];
        let out = composite_bend_events(&events);
        // Data entry emits one event (wheel centered), the wheel move another.
        assert_eq!(out.len(), 2);
        assert_relative_eq!(out[0].bend, 0.0);
        assert_relative_eq!(out[1].bend, (16383.0 - 8192.0) / 8192.0 * 12.0);
    }

    #[test]
    fn test_rpn_null_stops_data_entry() {
        let events = vec![
            cc(0, CC_RPN_MSB, 0),
            cc(0, CC_RPN_LSB, 0),
            cc(0, CC_RPN_MSB, 127),
            cc(0, CC_RPN_LSB, 127),
            cc(1, CC_DATA_ENTRY_MSB, 12),
            bend(10, 16383),
        ];
        let out = composite_bend_events(&events);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].bend, (16383.0 - 8192.0) / 8192.0 * 2.0);
    }

    #[test]
    fn test_nrpn_shadows_rpn() {
        let events = vec![
            cc(0, CC_RPN_MSB, 0),
            cc(0, CC_RPN_LSB, 0),
            cc(0, CC_NRPN_MSB, 5),
            cc(1, CC_DATA_ENTRY_MSB, 12),
            bend(10, 16383),
        ];
        let out = composite_bend_events(&events);
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].bend, (16383.0 - 8192.0) / 8192.0 * 2.0);
    }

    #[test]
    fn test_modulation_depth_range() {
        let events = vec![
            cc(0, CC_RPN_MSB, 0),
            cc(0, CC_RPN_LSB, 5),
            cc(0, CC_DATA_ENTRY_MSB, 1),
            cc(0, CC_DATA_ENTRY_LSB, 64),
        ];
        let out = modulation_depth_range_events(&events);
        assert_eq!(out.len(), 2);
        assert_relative_eq!(out[0].value, 1.0);
        assert_relative_eq!(out[1].value, 1.5);
    }

    #[test]
    fn test_unrelated_controls_are_ignored() {
        let events = vec![cc(0, 7, 100), cc(0, 1, 64)];
        assert!(composite_bend_events(&events).is_empty());
        assert!(modulation_depth_range_events(&events).is_empty());
    }
}
