//! Motor module for stepper-drive.
//!
//! The poll-driven drive engine, its master/slave roles, and position tracking.

mod builder;
mod deviation;
mod driver;
mod position;
pub mod role;

pub use builder::StepperMotorBuilder;
pub use deviation::DeviationMonitor;
pub use driver::StepperMotor;
pub use position::PositionTracker;
pub use role::{Follower, Master, Role, Slave};
