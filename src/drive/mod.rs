//! Drive module for stepper-drive.
//!
//! The shared command record, its status codes, and the snapshot exposed to
//! the reporting layer.

mod direction;
mod parameters;
mod status;

pub use direction::Direction;
pub use parameters::{DriveOwner, DriveParameters};
pub use status::{DriveSnapshot, DriveStatus};
