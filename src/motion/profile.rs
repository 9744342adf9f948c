//! Motion profile calculation.
//!
//! A profile is the precomputed absolute timestamp (seconds from movement
//! start) of every step pulse, following a trapezoidal velocity curve, or
//! a triangular one when the move is too short to reach max speed.

/// Computed motion profile for a move.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionProfile {
    /// Total steps to move (absolute value).
    pub total_steps: u32,

    /// Steps in the acceleration phase.
    pub accel_steps: u32,

    /// Steps in the constant-speed phase.
    pub const_steps: u32,

    /// Time to reach peak speed, in seconds.
    pub peak_time: f64,

    /// Absolute timestamp of each step, seconds from movement start.
    /// Non-decreasing; consecutive gaps are at least the minimum interval.
    pub step_times: Vec<f64>,
}

impl MotionProfile {
    /// Default floor between consecutive step pulses (100 us).
    pub const DEFAULT_MIN_INTERVAL: f64 = 0.0001;

    /// Plan a move of `steps` pulses.
    ///
    /// Acceleration-phase steps are placed at `t = sqrt(2*i/a)`,
    /// constant-phase steps at a fixed `1/max_speed` interval (floored to
    /// `min_interval`), deceleration-phase steps mirror the acceleration
    /// curve. If twice the acceleration distance exceeds the requested
    /// step count, the profile degenerates to a triangle with
    /// `accel_steps = steps / 2` (minimum 1) and a recomputed peak speed.
    ///
    /// The timestamp array always holds exactly `steps` entries, is
    /// non-decreasing, and never places two steps closer than
    /// `min_interval`.
    pub fn plan(steps: u32, max_speed: f64, acceleration: f64, min_interval: f64) -> Self {
        if steps == 0 || max_speed <= 0.0 || acceleration <= 0.0 {
            return Self {
                total_steps: 0,
                accel_steps: 0,
                const_steps: 0,
                peak_time: 0.0,
                step_times: Vec::new(),
            };
        }

        let accel_time = max_speed / acceleration;
        let mut accel_steps = (0.5 * acceleration * accel_time * accel_time) as u32;

        let peak_time = if 2 * accel_steps > steps {
            // Triangular profile: never reach max speed.
            accel_steps = (steps / 2).max(1);
            (2.0 * accel_steps as f64 / acceleration).sqrt()
        } else {
            accel_time
        };

        let const_steps = steps.saturating_sub(2 * accel_steps);
        let const_interval = (1.0 / max_speed).max(min_interval);
        let const_time = const_steps as f64 / max_speed;
        let decel_steps = steps - accel_steps.min(steps) - const_steps;

        let time_for_accel_step = |step: u32| (2.0 * step as f64 / acceleration).sqrt();

        let mut step_times = Vec::with_capacity(steps as usize);

        for step in 0..accel_steps.min(steps) {
            step_times.push(time_for_accel_step(step + 1));
        }

        for step in 0..const_steps {
            step_times.push(peak_time + (step + 1) as f64 * const_interval);
        }

        for step in 0..decel_steps {
            let mirror = accel_steps - step - 1;
            let decel_time = time_for_accel_step(accel_steps) - time_for_accel_step(mirror);
            step_times.push(peak_time + const_time + decel_time);
        }

        // Clamp forward so rounding never places two pulses closer than
        // the minimum interval.
        for i in 1..step_times.len() {
            if step_times[i] - step_times[i - 1] < min_interval {
                step_times[i] = step_times[i - 1] + min_interval;
            }
        }

        Self {
            total_steps: steps,
            accel_steps: accel_steps.min(steps),
            const_steps,
            peak_time,
            step_times,
        }
    }

    /// Whether this profile contains no steps.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.step_times.is_empty()
    }

    /// Timestamp of the final step, i.e. the planned movement duration.
    pub fn total_duration(&self) -> f64 {
        self.step_times.last().copied().unwrap_or(0.0)
    }

    /// Estimate the duration of a `steps`-pulse move without building the
    /// timestamp array. Mirrors the same trapezoidal/triangular math; for
    /// a triangular profile the total is `2 * sqrt(2 * accel_steps / a)`.
    pub fn estimate_duration(steps: u32, max_speed: f64, acceleration: f64) -> f64 {
        if steps == 0 || max_speed <= 0.0 || acceleration <= 0.0 {
            return 0.0;
        }

        let accel_time = max_speed / acceleration;
        let accel_steps = (0.5 * acceleration * accel_time * accel_time) as u32;

        if 2 * accel_steps > steps {
            let accel_steps = (steps / 2).max(1);
            2.0 * (2.0 * accel_steps as f64 / acceleration).sqrt()
        } else {
            let const_steps = steps - 2 * accel_steps;
            accel_time + const_steps as f64 / max_speed + accel_time
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MIN: f64 = MotionProfile::DEFAULT_MIN_INTERVAL;

    #[test]
    fn one_timestamp_per_step() {
        for steps in [0u32, 1, 2, 3, 10, 99, 1600] {
            let profile = MotionProfile::plan(steps, 7500.0, 20000.0, MIN);
            assert_eq!(profile.step_times.len(), steps as usize, "steps={steps}");
        }
    }

    #[test]
    fn timestamps_non_decreasing_with_min_gap() {
        let profile = MotionProfile::plan(1600, 7500.0, 20000.0, MIN);
        for pair in profile.step_times.windows(2) {
            assert!(pair[1] - pair[0] >= MIN - 1e-12);
        }
    }

    #[test]
    fn trapezoid_has_constant_phase() {
        // accel distance = v^2/2a = 7500^2/40000 ~ 1406 steps; 1600-step
        // move per side leaves a cruise phase for 4000 steps.
        let profile = MotionProfile::plan(4000, 7500.0, 20000.0, MIN);
        assert!(profile.const_steps > 0);
        assert_eq!(
            profile.accel_steps * 2 + profile.const_steps,
            profile.total_steps
        );
    }

    #[test]
    fn triangle_total_time_matches_formula() {
        let max_speed = 7500.0;
        let accel = 20000.0;
        // Short move: cannot reach max speed.
        let steps = 200;
        let profile = MotionProfile::plan(steps, max_speed, accel, MIN);
        assert_eq!(profile.const_steps, 0);

        let accel_steps = (steps / 2).max(1);
        let expected = 2.0 * (2.0 * accel_steps as f64 / accel).sqrt();
        let estimated = MotionProfile::estimate_duration(steps, max_speed, accel);
        assert!((estimated - expected).abs() < 1e-9);
        // The planned duration only deviates from the estimate by the
        // forward clamping, which can only lengthen it.
        assert!(profile.total_duration() >= expected - 1e-9);
    }

    #[test]
    fn single_step_profile() {
        let profile = MotionProfile::plan(1, 7500.0, 20000.0, MIN);
        assert_eq!(profile.step_times.len(), 1);
        assert!(profile.step_times[0] > 0.0);
    }

    #[test]
    fn planning_is_deterministic() {
        let a = MotionProfile::plan(1600, 7500.0, 20000.0, MIN);
        let b = MotionProfile::plan(1600, 7500.0, 20000.0, MIN);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_steps_empty() {
        let profile = MotionProfile::plan(0, 7500.0, 20000.0, MIN);
        assert!(profile.is_empty());
        assert_eq!(profile.total_duration(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_monotone_and_gapped(
            steps in 0u32..3000,
            max_speed in 10.0f64..20000.0,
            accel in 10.0f64..50000.0,
        ) {
            let profile = MotionProfile::plan(steps, max_speed, accel, MIN);
            prop_assert_eq!(profile.step_times.len(), steps as usize);
            for pair in profile.step_times.windows(2) {
                prop_assert!(pair[1] >= pair[0]);
                prop_assert!(pair[1] - pair[0] >= MIN - 1e-12);
            }
        }
    }
}
