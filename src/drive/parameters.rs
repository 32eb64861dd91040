//! Shared drive command record and its single-writer capability.
//!
//! A master motor and any number of slaves observe the same
//! [`DriveParameters`]. Only the holder of the [`DriveOwner`] returned by
//! [`DriveParameters::claim`] can write it, which makes the master the only
//! path that issues commands or consumes `steps_remaining`.
//!
//! The record is `Cell`-backed and therefore `!Sync`: all access happens in
//! one execution context, which is what lets slaves hold a plain shared
//! reference while the owner mutates.

use core::cell::Cell;

use crate::error::{MotorError, Result};

use super::direction::Direction;
use super::status::DriveStatus;

/// Command and state record of one independently commanded axis.
#[derive(Debug, Default)]
pub struct DriveParameters {
    steps_remaining: Cell<u32>,
    direction: Cell<Direction>,
    step_interval: Cell<u32>,
    ramp: Cell<u32>,
    override_active: Cell<bool>,
    status: Cell<DriveStatus>,
    commanded: Cell<u32>,
    sequence: Cell<u32>,
    claimed: Cell<bool>,
}

impl DriveParameters {
    /// Create an idle, never-homed record.
    pub const fn new() -> Self {
        Self {
            steps_remaining: Cell::new(0),
            direction: Cell::new(Direction::Toward),
            step_interval: Cell::new(0),
            ramp: Cell::new(0),
            override_active: Cell::new(false),
            status: Cell::new(DriveStatus::NoHome),
            commanded: Cell::new(0),
            sequence: Cell::new(0),
            claimed: Cell::new(false),
        }
    }

    /// Take the write capability for this record.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::DriveAlreadyClaimed` on every call after the first.
    pub fn claim(&self) -> Result<DriveOwner<'_>> {
        if self.claimed.replace(true) {
            return Err(MotorError::DriveAlreadyClaimed.into());
        }
        Ok(DriveOwner { params: self })
    }

    /// Steps still queued.
    #[inline]
    pub fn steps_remaining(&self) -> u32 {
        self.steps_remaining.get()
    }

    /// Commanded direction.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction.get()
    }

    /// Minimum time between pulses in microseconds.
    #[inline]
    pub fn step_interval(&self) -> u32 {
        self.step_interval.get()
    }

    /// Ramp bookkeeping counter.
    #[inline]
    pub fn ramp(&self) -> u32 {
        self.ramp.get()
    }

    /// Soft-limit and status gating bypass.
    #[inline]
    pub fn override_active(&self) -> bool {
        self.override_active.get()
    }

    /// Current status.
    #[inline]
    pub fn status(&self) -> DriveStatus {
        self.status.get()
    }

    /// Step count of the current command as issued.
    #[inline]
    pub fn commanded_steps(&self) -> u32 {
        self.commanded.get()
    }

    /// Steps of the current command already consumed by the owner.
    #[inline]
    pub fn steps_issued(&self) -> u32 {
        self.commanded.get().saturating_sub(self.steps_remaining.get())
    }

    /// Bumped on every command and stop, so followers can tell a new
    /// command from the one they are mirroring.
    #[inline]
    pub fn command_sequence(&self) -> u32 {
        self.sequence.get()
    }

    /// Nothing queued.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.steps_remaining.get() == 0
    }

    /// Whether a pulse may be emitted, timing aside.
    #[inline]
    pub fn may_pulse(&self) -> bool {
        self.steps_remaining.get() > 0 && self.motion_permitted()
    }

    /// Status allows motion, or override is active.
    #[inline]
    pub fn motion_permitted(&self) -> bool {
        self.status.get().permits_motion() || self.override_active.get()
    }
}

/// Write capability for a [`DriveParameters`] record.
///
/// Exactly one exists per record; it is neither `Clone` nor `Copy`.
#[derive(Debug)]
pub struct DriveOwner<'a> {
    params: &'a DriveParameters,
}

impl<'a> DriveOwner<'a> {
    /// The record this capability writes.
    #[inline]
    pub fn params(&self) -> &'a DriveParameters {
        self.params
    }

    /// Overwrite the queued command in one go.
    ///
    /// Soft limits are the motor's concern; see
    /// [`StepperMotor::set_drive`](crate::motor::StepperMotor::set_drive).
    pub fn command(&self, steps: u32, direction: Direction, step_interval: u32, ramp: u32) {
        self.params.steps_remaining.set(steps);
        self.params.direction.set(direction);
        self.params.step_interval.set(step_interval);
        self.params.ramp.set(ramp);
        self.params.commanded.set(steps);
        self.params.sequence.set(self.params.sequence.get().wrapping_add(1));
    }

    /// Zero steps, direction, interval and ramp. Status is left alone.
    pub fn all_stop(&self) {
        self.command(0, Direction::Toward, 0, 0);
    }

    /// Bypass soft limits and status gating.
    pub fn override_on(&self) {
        self.params.override_active.set(true);
    }

    /// Restore soft limits and status gating.
    pub fn override_off(&self) {
        self.params.override_active.set(false);
    }

    /// Caller-driven recovery from a fault.
    ///
    /// Overlimit and encoder deviation return to `Ready`. A homing timeout
    /// leaves the axis un-homed, so it returns to `NoHome`. Any other status
    /// is left unchanged. Returns the resulting status.
    pub fn acknowledge_fault(&self) -> DriveStatus {
        let next = match self.params.status.get() {
            DriveStatus::Overlimit | DriveStatus::EncoderDeviation => DriveStatus::Ready,
            DriveStatus::HomingTimeout => DriveStatus::NoHome,
            other => other,
        };
        self.set_status(next);
        next
    }

    pub(crate) fn set_status(&self, status: DriveStatus) {
        let previous = self.params.status.replace(status);
        if previous != status {
            trace!("drive status {} -> {}", previous, status);
        }
    }

    /// Consume one queued step.
    pub(crate) fn consume_step(&self) {
        let remaining = self.params.steps_remaining.get();
        self.params.steps_remaining.set(remaining.saturating_sub(1));
    }

    /// Ramp bookkeeping for one pulse: wind down while far from the end of
    /// the move, build up once fewer than `threshold` steps remain.
    pub(crate) fn adjust_ramp(&self, threshold: u32) {
        let steps = self.params.steps_remaining.get();
        let ramp = self.params.ramp.get();
        if ramp > 0 && steps > threshold {
            self.params.ramp.set(ramp - 1);
        }
        if steps < threshold {
            self.params.ramp.set(self.params.ramp.get().saturating_add(1));
        }
    }
}
