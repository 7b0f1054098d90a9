// src/rotation/policy.rs
//! Probability curve for persona rotation.
//!
//! Rotation is not a fixed-period swap. Each scheduler pass draws a random
//! number and compares it against a chance that climbs in three bands as the
//! configured interval elapses, so participants cannot predict the swap from
//! a wall clock. Once a full interval has passed, rotation is guaranteed.

/// Staged rotation chance over one interval.
///
/// With the defaults, a pass rotates with 10% chance before a third of the
/// interval has elapsed, 40% between a third and two thirds, 70% in the final
/// third, and always once the interval is up.
#[derive(Debug, Clone, Copy)]
pub struct RotationCurve {
    /// Fraction of the interval where the early band ends.
    pub early_fraction: f64,
    /// Fraction of the interval where the late band begins.
    pub late_fraction: f64,
    pub early_chance: f64,
    pub mid_chance: f64,
    pub late_chance: f64,
}

impl Default for RotationCurve {
    fn default() -> Self {
        Self {
            early_fraction: 0.33,
            late_fraction: 0.66,
            early_chance: 0.1,
            mid_chance: 0.4,
            late_chance: 0.7,
        }
    }
}

impl RotationCurve {
    /// Chance of rotating after `elapsed_minutes` of an `interval_minutes`
    /// window. Returns 1.0 once the interval has fully elapsed.
    pub fn probability(&self, elapsed_minutes: f64, interval_minutes: f64) -> f64 {
        if interval_minutes <= 0.0 || elapsed_minutes >= interval_minutes {
            return 1.0;
        }
        let fraction = (elapsed_minutes / interval_minutes).max(0.0);
        if fraction >= self.late_fraction {
            self.late_chance
        } else if fraction >= self.early_fraction {
            self.mid_chance
        } else {
            self.early_chance
        }
    }

    /// Decide a single pass given a uniform draw in [0, 1).
    pub fn should_rotate(&self, elapsed_minutes: f64, interval_minutes: f64, draw: f64) -> bool {
        draw < self.probability(elapsed_minutes, interval_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_elapsed_fraction() {
        let curve = RotationCurve::default();

        assert_eq!(curve.probability(0.0, 100.0), 0.1);
        assert_eq!(curve.probability(32.9, 100.0), 0.1);
        assert_eq!(curve.probability(33.0, 100.0), 0.4);
        assert_eq!(curve.probability(65.9, 100.0), 0.4);
        assert_eq!(curve.probability(66.0, 100.0), 0.7);
        assert_eq!(curve.probability(99.9, 100.0), 0.7);
        assert_eq!(curve.probability(100.0, 100.0), 1.0);
        assert_eq!(curve.probability(500.0, 100.0), 1.0);
    }

    #[test]
    fn draw_is_compared_against_band_chance() {
        let curve = RotationCurve::default();

        // Early band: only draws under 0.1 rotate.
        assert!(curve.should_rotate(10.0, 100.0, 0.05));
        assert!(!curve.should_rotate(10.0, 100.0, 0.1));
        assert!(!curve.should_rotate(10.0, 100.0, 0.95));

        // Mid band.
        assert!(curve.should_rotate(50.0, 100.0, 0.39));
        assert!(!curve.should_rotate(50.0, 100.0, 0.4));

        // Late band.
        assert!(curve.should_rotate(80.0, 100.0, 0.69));
        assert!(!curve.should_rotate(80.0, 100.0, 0.7));

        // Past the interval every draw rotates.
        assert!(curve.should_rotate(100.0, 100.0, 0.999));
    }

    #[test]
    fn clock_skew_counts_as_early() {
        let curve = RotationCurve::default();
        assert_eq!(curve.probability(-5.0, 100.0), 0.1);
    }

    #[test]
    fn degenerate_interval_always_rotates() {
        let curve = RotationCurve::default();
        assert_eq!(curve.probability(0.0, 0.0), 1.0);
    }

    #[test]
    fn custom_curve_overrides_defaults() {
        let curve = RotationCurve {
            early_fraction: 0.5,
            late_fraction: 0.9,
            early_chance: 0.0,
            mid_chance: 0.2,
            late_chance: 1.0,
        };
        assert!(!curve.should_rotate(10.0, 100.0, 0.0));
        assert_eq!(curve.probability(60.0, 100.0), 0.2);
        assert_eq!(curve.probability(95.0, 100.0), 1.0);
    }
}
