//! Motor configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::homing::HomingConfig;
use super::limits::{TravelLimits, DEFAULT_LIMIT_MARGIN, DEFAULT_MAX_ANGLE};
use super::sensor::{DeviationConfig, SensorConfig};

/// Default number of queued steps below which the ramp counter climbs.
pub const DEFAULT_RAMP_THRESHOLD: u32 = 2000;

/// Complete motor configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Far travel boundary in steps.
    #[serde(rename = "max_angle_steps", default = "default_max_angle")]
    pub max_angle: i64,

    /// Keep-out margin at both travel boundaries, in steps.
    #[serde(rename = "limit_margin_steps", default = "default_margin")]
    pub limit_margin: i64,

    /// Ramp bookkeeping threshold in queued steps.
    #[serde(rename = "ramp_threshold_steps", default = "default_ramp_threshold")]
    pub ramp_threshold: u32,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Key of the motor this one follows, if it is a slave.
    #[serde(default)]
    pub slave_of: Option<String<32>>,

    /// Slave direction is the complement of the master's.
    #[serde(default)]
    pub slave_inverted: bool,

    /// Position sensor calibration.
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Step/sensor deviation check.
    #[serde(default)]
    pub deviation: DeviationConfig,

    /// Homing sequence.
    #[serde(default)]
    pub homing: HomingConfig,
}

fn default_max_angle() -> i64 {
    DEFAULT_MAX_ANGLE
}

fn default_margin() -> i64 {
    DEFAULT_LIMIT_MARGIN
}

fn default_ramp_threshold() -> u32 {
    DEFAULT_RAMP_THRESHOLD
}

impl MotorConfig {
    /// Create a configuration with every optional field at its default.
    pub fn new(name: &str) -> Self {
        Self {
            name: String::try_from(name).unwrap_or_default(),
            max_angle: DEFAULT_MAX_ANGLE,
            limit_margin: DEFAULT_LIMIT_MARGIN,
            ramp_threshold: DEFAULT_RAMP_THRESHOLD,
            invert_direction: false,
            slave_of: None,
            slave_inverted: false,
            sensor: SensorConfig::default(),
            deviation: DeviationConfig::default(),
            homing: HomingConfig::default(),
        }
    }

    /// Soft travel limits of this motor.
    pub fn limits(&self) -> TravelLimits {
        TravelLimits::new(self.max_angle, self.limit_margin)
    }

    /// Whether this motor follows another one.
    pub fn is_slave(&self) -> bool {
        self.slave_of.is_some()
    }
}
