//! Drive status codes and the externally polled snapshot.

use crate::config::units::Steps;

/// State of a drive, shared by a master and its slaves.
///
/// `NoHome` is the only initial state. `Overlimit`, `EncoderDeviation` and
/// `HomingTimeout` are faults: nothing clears them except the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DriveStatus {
    /// Idle and homed.
    Ready = 0,
    /// Executing a command.
    Driving = 1,
    /// Homing sequence in progress.
    Homing = 2,
    /// Never homed since power-up.
    #[default]
    NoHome = 9,
    /// A command would have ended inside the soft-limit margin.
    Overlimit = 10,
    /// Step count and sensor position disagree.
    EncoderDeviation = 11,
    /// Homing did not find the limit switch in time.
    HomingTimeout = 12,
}

impl DriveStatus {
    /// Numeric code reported to the outer firmware.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a numeric status code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Ready),
            1 => Some(Self::Driving),
            2 => Some(Self::Homing),
            9 => Some(Self::NoHome),
            10 => Some(Self::Overlimit),
            11 => Some(Self::EncoderDeviation),
            12 => Some(Self::HomingTimeout),
            _ => None,
        }
    }

    /// Whether this is a fault that only the caller can clear.
    #[inline]
    pub const fn is_fault(self) -> bool {
        matches!(
            self,
            Self::Overlimit | Self::EncoderDeviation | Self::HomingTimeout
        )
    }

    /// Whether pulses may be emitted without override.
    #[inline]
    pub const fn permits_motion(self) -> bool {
        matches!(self, Self::Ready | Self::Homing | Self::Driving)
    }

    /// Status name for display/debugging.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Driving => "Driving",
            Self::Homing => "Homing",
            Self::NoHome => "NoHome",
            Self::Overlimit => "Overlimit",
            Self::EncoderDeviation => "EncoderDeviation",
            Self::HomingTimeout => "HomingTimeout",
        }
    }
}

impl core::fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only status record for whatever layer reports motor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveSnapshot {
    /// Absolute position in steps since the last homing reset.
    pub absolute_steps: Steps,
    /// Position relative to the work offset.
    pub work_offset_steps: Steps,
    /// Status at the last refresh.
    pub status: DriveStatus,
    /// No steps queued at the last refresh.
    pub drive_ready: bool,
}
