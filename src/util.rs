//! Small animation helpers.

/// Smoothly chases a target value, frame-rate independently.
///
/// Each tick moves the current value toward the target by a fraction
/// proportional to elapsed time and the smoothness constant. Higher
/// smoothness chases faster; zero smoothness tracks the target exactly.
#[derive(Debug, Clone, Copy)]
pub struct NumberSmoother {
    value: f32,
    smoothness: f64,
}

impl NumberSmoother {
    pub fn new(initial: f32, smoothness: f64) -> Self {
        Self {
            value: initial,
            smoothness,
        }
    }

    /// The current smoothed value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Advances the smoother by `delta` seconds toward `target`.
    pub fn tick(&mut self, delta: f64, target: f32) -> f32 {
        if self.smoothness == 0.0 {
            self.value = target;
        } else {
            self.value += ((target - self.value) as f64 * delta * self.smoothness) as f32;
        }
        self.value
    }

    /// Jumps straight to `value` with no smoothing.
    pub fn snap(&mut self, value: f32) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tick_approaches_target() {
        let mut s = NumberSmoother::new(0.0, 10.0);
        let mut previous = 0.0;
        for _ in 0..20 {
            let value = s.tick(0.016, 1.0);
            assert!(value > previous);
            assert!(value <= 1.0);
            previous = value;
        }
    }

    #[test]
    fn test_zero_smoothness_tracks_exactly() {
        let mut s = NumberSmoother::new(0.0, 0.0);
        assert_relative_eq!(s.tick(0.016, 3.5), 3.5);
    }

    #[test]
    fn test_snap_overrides_history() {
        let mut s = NumberSmoother::new(0.0, 10.0);
        s.tick(0.016, 1.0);
        s.snap(-2.0);
        assert_relative_eq!(s.value(), -2.0);
    }

    #[test]
    fn test_at_target_stays_put() {
        let mut s = NumberSmoother::new(1.0, 10.0);
        assert_relative_eq!(s.tick(0.016, 1.0), 1.0);
    }
}
