//! Position sensor and deviation check configuration.

use serde::Deserialize;

/// Calibration of the analog position sensor.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Sensor counts per revolution; readings are `0..counts_per_revolution`.
    pub counts_per_revolution: u16,

    /// Inclusive lower edge of the band that re-arms wrap detection.
    pub dead_band_low: u16,

    /// Exclusive upper edge of the re-arm band.
    pub dead_band_high: u16,

    /// Jump between consecutive readings treated as a wrap.
    pub wrap_threshold: u16,

    /// Motor steps per sensor count.
    pub steps_per_count: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            counts_per_revolution: 1024,
            dead_band_low: 400,
            dead_band_high: 600,
            wrap_threshold: 100,
            steps_per_count: 3.125,
        }
    }
}

impl SensorConfig {
    /// Whether a reading lies in the re-arm band.
    #[inline]
    pub fn in_dead_band(&self, reading: u16) -> bool {
        reading >= self.dead_band_low && reading < self.dead_band_high
    }

    /// Largest valid reading.
    #[inline]
    pub fn max_reading(&self) -> u16 {
        self.counts_per_revolution.saturating_sub(1)
    }
}

/// Step/sensor deviation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviationConfig {
    /// Off until the sensor calibration has been validated on the machine.
    pub enabled: bool,

    /// Largest tolerated difference between the two position estimates.
    pub tolerance_steps: i64,
}

impl Default for DeviationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tolerance_steps: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dead_band_edges() {
        let sensor = SensorConfig::default();
        assert!(!sensor.in_dead_band(399));
        assert!(sensor.in_dead_band(400));
        assert!(sensor.in_dead_band(599));
        assert!(!sensor.in_dead_band(600));
        assert_eq!(sensor.max_reading(), 1023);
    }
}
