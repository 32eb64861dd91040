//! Position tracking for stepper motors.
//!
//! Two independent views of where the motor is: the signed count of pulses
//! issued, and the unwrapped reading of the analog position sensor. They are
//! never merged here; only the deviation check compares them.

use crate::config::units::{SensorCounts, Steps};
use crate::config::SensorConfig;
use crate::drive::Direction;

/// Motor position tracker.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    /// Pulses issued since the last reset (+ away, - toward)
    absolute_steps: Steps,
    /// Absolute position captured as the logical zero
    work_offset: Steps,
    reading: u16,
    reading_prev: u16,
    revolutions: i64,
    accumulated_delta: i64,
    wrap_armed_up: bool,
    wrap_armed_down: bool,
    /// Sensor position captured alongside `work_offset`
    sensor_offset: SensorCounts,
    calibration: SensorConfig,
}

impl PositionTracker {
    /// Create a tracker at the origin.
    pub fn new(calibration: SensorConfig) -> Self {
        Self {
            absolute_steps: Steps::ZERO,
            work_offset: Steps::ZERO,
            reading: 0,
            reading_prev: 0,
            revolutions: 0,
            accumulated_delta: 0,
            wrap_armed_up: true,
            wrap_armed_down: true,
            sensor_offset: SensorCounts::default(),
            calibration,
        }
    }

    /// Sensor calibration in use.
    #[inline]
    pub fn calibration(&self) -> &SensorConfig {
        &self.calibration
    }

    /// Pulses issued since the last reset.
    #[inline]
    pub fn absolute_steps(&self) -> Steps {
        self.absolute_steps
    }

    /// Position relative to the work offset.
    #[inline]
    pub fn work_offset_steps(&self) -> Steps {
        self.absolute_steps - self.work_offset
    }

    /// The captured work offset, in absolute steps.
    #[inline]
    pub fn work_offset(&self) -> Steps {
        self.work_offset
    }

    /// Record one pulse in `direction`.
    #[inline]
    pub fn advance(&mut self, direction: Direction) {
        self.absolute_steps = Steps(self.absolute_steps.0 + direction.sign());
    }

    /// Return to the origin and re-seed the sensor baseline from `reading`.
    ///
    /// The work offset and sensor offset are kept.
    pub fn reset(&mut self, reading: u16) {
        self.absolute_steps = Steps::ZERO;
        self.revolutions = 0;
        self.accumulated_delta = 0;
        self.wrap_armed_up = true;
        self.wrap_armed_down = true;
        self.reading = reading;
        self.reading_prev = reading;
    }

    /// Fold a new sensor reading into the unwrapped sensor position.
    ///
    /// A jump larger than the wrap threshold is a pass through the sensor's
    /// zero. Each wrap direction disarms itself until the reading has been
    /// back inside the dead band, so a reading chattering at the boundary is
    /// counted once. Returns the change in whole revolutions.
    pub fn update_sensor(&mut self, reading: u16) -> i64 {
        self.reading = reading;
        if self.calibration.in_dead_band(reading) {
            self.wrap_armed_up = true;
            self.wrap_armed_down = true;
        }

        let delta = reading as i64 - self.reading_prev as i64;
        self.reading_prev = reading;
        self.accumulated_delta += delta;

        let threshold = self.calibration.wrap_threshold as i64;
        if delta > threshold && self.wrap_armed_up {
            self.revolutions -= 1;
            self.wrap_armed_up = false;
            self.wrap_armed_down = true;
            -1
        } else if delta < -threshold && self.wrap_armed_down {
            self.revolutions += 1;
            self.wrap_armed_down = false;
            self.wrap_armed_up = true;
            1
        } else {
            0
        }
    }

    /// Latest raw sensor reading.
    #[inline]
    pub fn reading(&self) -> u16 {
        self.reading
    }

    /// Whole sensor revolutions counted since the last reset.
    #[inline]
    pub fn revolutions(&self) -> i64 {
        self.revolutions
    }

    /// Sum of reading deltas since the last reset.
    #[inline]
    pub fn accumulated_delta(&self) -> i64 {
        self.accumulated_delta
    }

    /// Wrap detection arming, `(up, down)`.
    #[inline]
    pub fn wrap_armed(&self) -> (bool, bool) {
        (self.wrap_armed_up, self.wrap_armed_down)
    }

    /// Unwrapped sensor position in counts.
    #[inline]
    pub fn sensor_counts(&self) -> SensorCounts {
        SensorCounts(
            self.revolutions * self.calibration.counts_per_revolution as i64
                + self.accumulated_delta,
        )
    }

    /// Sensor-derived absolute position, in steps.
    #[inline]
    pub fn sensor_absolute(&self) -> Steps {
        self.sensor_counts().to_steps(self.calibration.steps_per_count)
    }

    /// Sensor-derived position relative to the sensor work offset, in steps.
    #[inline]
    pub fn sensor_work_offset(&self) -> Steps {
        (self.sensor_counts() - self.sensor_offset).to_steps(self.calibration.steps_per_count)
    }

    /// Capture the current position as the logical zero of both views.
    pub fn capture_work_offset(&mut self) {
        self.work_offset = self.absolute_steps;
        self.sensor_offset = self.sensor_counts();
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new(SensorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_at(reading: u16) -> PositionTracker {
        let mut tracker = PositionTracker::default();
        tracker.reset(reading);
        tracker
    }

    #[test]
    fn test_step_counting() {
        let mut tracker = PositionTracker::default();

        for _ in 0..10 {
            tracker.advance(Direction::Away);
        }
        for _ in 0..3 {
            tracker.advance(Direction::Toward);
        }
        assert_eq!(tracker.absolute_steps(), Steps(7));
    }

    #[test]
    fn test_work_offset() {
        let mut tracker = PositionTracker::default();
        for _ in 0..100 {
            tracker.advance(Direction::Away);
        }

        tracker.capture_work_offset();
        assert_eq!(tracker.work_offset_steps(), Steps(0));
        assert_eq!(tracker.absolute_steps(), Steps(100));

        tracker.advance(Direction::Toward);
        assert_eq!(tracker.work_offset_steps(), Steps(-1));
    }

    #[test]
    fn test_forward_wrap_counts_one_revolution() {
        let mut tracker = tracker_at(900);

        // Rising through 1023 -> 0 is a large negative jump
        for reading in [960, 1010, 20, 70] {
            tracker.update_sensor(reading);
        }
        assert_eq!(tracker.revolutions(), 1);
        // 1024 - 900 + 70 counts travelled
        assert_eq!(tracker.sensor_counts(), SensorCounts(194));
    }

    #[test]
    fn test_backward_wrap_counts_one_revolution() {
        let mut tracker = tracker_at(100);

        for reading in [50, 5, 1000, 950] {
            tracker.update_sensor(reading);
        }
        assert_eq!(tracker.revolutions(), -1);
        assert_eq!(tracker.sensor_counts(), SensorCounts(-174));
    }

    #[test]
    fn test_bounce_across_boundary_nets_zero() {
        let mut tracker = tracker_at(1000);

        assert_eq!(tracker.update_sensor(10), 1);
        assert_eq!(tracker.update_sensor(1015), -1);
        assert_eq!(tracker.update_sensor(5), 1);
        assert_eq!(tracker.update_sensor(1020), -1);
        assert_eq!(tracker.revolutions(), 0);
    }

    #[test]
    fn test_repeated_wrap_needs_rearm() {
        let mut tracker = tracker_at(1000);

        assert_eq!(tracker.update_sensor(10), 1);
        assert_eq!(tracker.wrap_armed(), (true, false));

        // Noise near the boundary: second forward jump is ignored
        assert_eq!(tracker.update_sensor(110), 0);
        assert_eq!(tracker.update_sensor(5), 0);
        assert_eq!(tracker.revolutions(), 1);

        // Passing through the dead band re-arms both directions
        for reading in [95, 185, 275, 365, 455] {
            tracker.update_sensor(reading);
        }
        assert_eq!(tracker.wrap_armed(), (true, true));
    }

    #[test]
    fn test_dead_band_oscillation_keeps_revolutions() {
        let mut tracker = tracker_at(500);

        for reading in [420, 510, 590, 520, 440, 400, 480, 560, 599, 530] {
            assert_eq!(tracker.update_sensor(reading), 0);
        }
        assert_eq!(tracker.revolutions(), 0);
        assert_eq!(tracker.sensor_counts(), SensorCounts(30));
    }

    #[test]
    fn test_sensor_scaling_and_offset() {
        let mut tracker = tracker_at(0);
        for reading in [90, 180, 270, 360, 416] {
            tracker.update_sensor(reading);
        }
        assert_eq!(tracker.sensor_absolute(), Steps(1300));

        tracker.capture_work_offset();
        assert_eq!(tracker.sensor_work_offset(), Steps(0));

        tracker.update_sensor(448);
        assert_eq!(tracker.sensor_work_offset(), Steps(100));
        assert_eq!(tracker.sensor_absolute(), Steps(1400));
    }

    #[test]
    fn test_reset_keeps_offsets() {
        let mut tracker = tracker_at(0);
        for _ in 0..20 {
            tracker.advance(Direction::Away);
        }
        tracker.capture_work_offset();
        tracker.reset(300);

        assert_eq!(tracker.absolute_steps(), Steps(0));
        assert_eq!(tracker.work_offset(), Steps(20));
        assert_eq!(tracker.work_offset_steps(), Steps(-20));
        assert_eq!(tracker.reading(), 300);
        assert_eq!(tracker.sensor_counts(), SensorCounts(0));
    }
}
