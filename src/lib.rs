//! # stepper-drive
//!
//! Poll-driven stepper motor drive engine with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Non-blocking stepping**: one call to [`StepperMotor::drive_tick`] emits at most one pulse
//! - **Soft travel limits**: commands that would end near either travel boundary are rejected
//! - **Master/slave coupling**: slaves mirror a master's command without consuming it
//! - **Resumable homing**: three-stage limit-switch homing driven by the same poll loop
//! - **Dual position model**: step-counted and encoder-derived positions with drift detection
//! - **no_std compatible**: core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_drive::{Clock, Direction, DriveParameters, HomingController, StepperMotorBuilder};
//!
//! let config = stepper_drive::load_config("axes.toml")?;
//! let params = DriveParameters::new();
//! let mut motor = StepperMotorBuilder::new()
//!     .from_config(&config, "x_axis")?
//!     .step_pin(step_pin)
//!     .dir_pin(dir_pin)
//!     .sensor(encoder)
//!     .build(params.claim()?)?;
//!
//! let homing_config = config.motor("x_axis").map(|m| m.homing).unwrap_or_default();
//! let mut homing = HomingController::new(limit_pin, homing_config);
//! homing.run_to_completion(&mut motor, &mut [], &clock)?;
//!
//! motor.set_drive(1000, Direction::Away, 400, 0);
//! loop {
//!     motor.drive_tick(clock.now())?;
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod drive;
pub mod error;
pub mod hal;
pub mod homing;
pub mod motor;

// Re-exports for ergonomic API
pub use config::{validate_config, MotorConfig, SystemConfig};
pub use drive::{Direction, DriveOwner, DriveParameters, DriveSnapshot, DriveStatus};
pub use error::{Error, Result};
pub use hal::{Clock, NoSensor, PositionSensor};
pub use homing::{HomingController, HomingProgress, HomingStage};
pub use motor::{Follower, PositionTracker, StepperMotor, StepperMotorBuilder};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;

// Unit types
pub use config::units::{SensorCounts, Steps};
