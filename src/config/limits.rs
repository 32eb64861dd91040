//! Soft travel limits.

use super::units::Steps;
use crate::drive::Direction;

/// Default travel boundary in steps.
pub const DEFAULT_MAX_ANGLE: i64 = 40_000;

/// Default distance kept from either travel boundary.
pub const DEFAULT_LIMIT_MARGIN: i64 = 50;

/// Travel range `[0, max_angle]` with a keep-out margin at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelLimits {
    /// Far travel boundary in steps (the near boundary is the homed zero).
    pub max_angle: i64,

    /// Moves may not end closer than this to either boundary.
    pub margin: i64,
}

impl Default for TravelLimits {
    fn default() -> Self {
        Self {
            max_angle: DEFAULT_MAX_ANGLE,
            margin: DEFAULT_LIMIT_MARGIN,
        }
    }
}

impl TravelLimits {
    /// Create new travel limits.
    pub fn new(max_angle: i64, margin: i64) -> Self {
        Self { max_angle, margin }
    }

    /// Check the margin leaves a usable range.
    pub fn is_valid(&self) -> bool {
        self.margin >= 0 && self.max_angle > 2 * self.margin
    }

    /// Whether a move of `steps` from `position` would stay clear of the boundaries.
    ///
    /// Only the boundary in the direction of travel is checked.
    pub fn permits(&self, position: Steps, steps: u32, direction: Direction) -> bool {
        let steps = steps as i64;
        match direction {
            Direction::Away => position.0 + steps <= self.max_angle - self.margin,
            Direction::Toward => position.0 - steps >= self.margin,
        }
    }
}
