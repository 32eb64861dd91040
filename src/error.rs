//! Error types for stepper-drive library.
//!
//! Drive faults (overlimit, encoder deviation, homing timeout) are not errors:
//! they are recorded as [`DriveStatus`](crate::drive::DriveStatus) values.
//! The types here cover configuration problems and failed hardware I/O.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-drive operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor hardware or wiring error
    Motor(MotorError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Motor name not found in configuration
    MotorNotFound(heapless::String<32>),
    /// Travel range too short for the configured soft-limit margin
    InvalidTravel {
        /// Configured travel boundary in steps
        max_angle: i64,
        /// Configured soft-limit margin in steps
        margin: i64,
    },
    /// Sensor dead band is empty or outside the sensor range
    InvalidDeadBand {
        /// Inclusive lower edge
        low: u16,
        /// Exclusive upper edge
        high: u16,
    },
    /// Wrap detection threshold must be in `1..counts_per_revolution`
    InvalidWrapThreshold(u16),
    /// Sensor scale must be > 0
    InvalidSensorScale(f32),
    /// Homing parameter must be non-zero
    InvalidHoming(&'static str),
    /// `slave_of` names a motor that does not exist, itself, or another slave
    InvalidSlaveBinding {
        /// Motor declaring the binding
        motor: heapless::String<32>,
        /// Referenced master
        master: heapless::String<32>,
    },
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor hardware and wiring errors.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// Pin operation failed
    PinError,
    /// Position sensor read failed
    SensorError,
    /// Position sensor returned a reading above its configured range
    SensorOutOfRange(u16),
    /// The drive parameters already have an owner
    DriveAlreadyClaimed,
    /// Builder is missing a required component
    MissingComponent(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::MotorNotFound(name) => write!(f, "Motor '{}' not found", name),
            ConfigError::InvalidTravel { max_angle, margin } => write!(
                f,
                "Invalid travel: max_angle_steps ({}) must exceed twice the limit margin ({})",
                max_angle, margin
            ),
            ConfigError::InvalidDeadBand { low, high } => {
                write!(f, "Invalid sensor dead band [{}, {})", low, high)
            }
            ConfigError::InvalidWrapThreshold(v) => write!(f, "Invalid wrap threshold: {}", v),
            ConfigError::InvalidSensorScale(v) => {
                write!(f, "Invalid steps_per_count: {}. Must be > 0", v)
            }
            ConfigError::InvalidHoming(field) => {
                write!(f, "Invalid homing configuration: {} must be > 0", field)
            }
            ConfigError::InvalidSlaveBinding { motor, master } => {
                write!(f, "Motor '{}' cannot be slaved to '{}'", motor, master)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
            MotorError::SensorError => write!(f, "Position sensor read failed"),
            MotorError::SensorOutOfRange(v) => {
                write!(f, "Position sensor reading {} out of range", v)
            }
            MotorError::DriveAlreadyClaimed => {
                write!(f, "Drive parameters already have an owner")
            }
            MotorError::MissingComponent(what) => write!(f, "{} is required", what),
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}
