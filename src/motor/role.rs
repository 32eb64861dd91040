//! Motor role type-state markers.
//!
//! A motor is either the [`Master`] of a drive, holding the write capability
//! for its [`DriveParameters`], or a [`Slave`] holding a read-only reference
//! to another motor's parameters. The set is sealed.

use crate::drive::{DriveOwner, DriveParameters, DriveSnapshot};
use crate::error::Result;

/// Motor owns its drive parameters.
#[derive(Debug)]
pub struct Master<'a> {
    pub(crate) owner: DriveOwner<'a>,
}

/// Motor follows a master's drive parameters.
#[derive(Debug, Clone)]
pub struct Slave<'a> {
    pub(crate) params: &'a DriveParameters,
    /// Direction output is the complement of the master's
    pub(crate) invert: bool,
    /// Command sequence being mirrored
    pub(crate) sequence: u32,
    /// Pulses emitted for that command
    pub(crate) mirrored: u32,
}

impl<'a> Slave<'a> {
    /// Follow `params` from its current command onward. Steps the owner has
    /// already issued are not replayed.
    pub(crate) fn following(params: &'a DriveParameters, invert: bool) -> Self {
        Self {
            params,
            invert,
            sequence: params.command_sequence(),
            mirrored: params.steps_issued(),
        }
    }

    /// Pick up a new command if the owner issued one.
    pub(crate) fn sync(&mut self) {
        let sequence = self.params.command_sequence();
        if sequence != self.sequence {
            self.sequence = sequence;
            self.mirrored = 0;
        }
    }

    /// Whether the current command still owes this slave a pulse.
    pub(crate) fn owes_pulse(&self) -> bool {
        self.mirrored < self.params.commanded_steps() && self.params.motion_permitted()
    }
}

/// Trait for motor roles.
pub trait Role: private::Sealed {
    /// The drive parameters this motor executes.
    fn params(&self) -> &DriveParameters;

    /// Whether the DIR output is flipped relative to the commanded direction.
    fn inverts_direction(&self) -> bool;

    /// Role name for display/debugging.
    fn name() -> &'static str;
}

impl Role for Master<'_> {
    #[inline]
    fn params(&self) -> &DriveParameters {
        self.owner.params()
    }

    #[inline]
    fn inverts_direction(&self) -> bool {
        false
    }

    fn name() -> &'static str {
        "Master"
    }
}

impl Role for Slave<'_> {
    #[inline]
    fn params(&self) -> &DriveParameters {
        self.params
    }

    #[inline]
    fn inverts_direction(&self) -> bool {
        self.invert
    }

    fn name() -> &'static str {
        "Slave"
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Master<'_> {}
    impl Sealed for super::Slave<'_> {}
}

/// Object-safe view of a slave motor, so a master can tick followers with
/// different pin types in one poll.
pub trait Follower {
    /// Emit at most one pulse mirroring the master's command.
    fn follow_tick(&mut self, now: u32) -> Result<bool>;

    /// Zero this motor's own position tracker.
    fn reset_position(&mut self) -> Result<()>;

    /// Latest status snapshot of this motor.
    fn snapshot(&self) -> DriveSnapshot;
}
