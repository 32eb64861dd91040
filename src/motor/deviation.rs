//! Step/sensor deviation check.

use crate::config::units::Steps;
use crate::config::DeviationConfig;

use super::position::PositionTracker;

/// Compares the step-counted and sensor-derived positions of one motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviationMonitor {
    config: DeviationConfig,
}

impl DeviationMonitor {
    /// Create a monitor from configuration.
    pub fn new(config: DeviationConfig) -> Self {
        Self { config }
    }

    /// Whether the check can fire.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enable or disable the check at runtime.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Tolerated difference in steps.
    #[inline]
    pub fn tolerance(&self) -> i64 {
        self.config.tolerance_steps
    }

    /// Difference between the magnitudes of the two position estimates.
    ///
    /// Magnitudes are compared, so the result does not depend on which way
    /// the sensor counts relative to the motor.
    pub fn deviation(&self, tracker: &PositionTracker) -> Steps {
        let steps = tracker.absolute_steps().abs() as i64;
        let sensor = tracker.sensor_absolute().abs() as i64;
        Steps((steps - sensor).abs())
    }

    /// Whether the estimates disagree by more than the tolerance.
    ///
    /// Always `false` while the check is disabled.
    pub fn exceeds(&self, tracker: &PositionTracker) -> bool {
        self.config.enabled && self.deviation(tracker).0 > self.config.tolerance_steps
    }
}
