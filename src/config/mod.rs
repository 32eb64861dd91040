//! Configuration module for stepper-drive.
//!
//! Provides types for loading and validating motor configurations
//! from TOML files (with `std` feature) or pre-parsed data.

mod homing;
mod limits;
mod motor;
mod sensor;
mod system;
pub mod units;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use homing::HomingConfig;
pub use limits::{TravelLimits, DEFAULT_LIMIT_MARGIN, DEFAULT_MAX_ANGLE};
pub use motor::{MotorConfig, DEFAULT_RAMP_THRESHOLD};
pub use sensor::{DeviationConfig, SensorConfig};
pub use system::SystemConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{SensorCounts, Steps};
