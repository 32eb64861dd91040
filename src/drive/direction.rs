//! Direction of travel relative to the limit switch.

use embedded_hal::digital::PinState;

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward the limit switch (position decreases).
    #[default]
    Toward,
    /// Away from the limit switch (position increases).
    Away,
}

impl Direction {
    /// Decode the firmware's binary direction (`0` toward, anything else away).
    #[inline]
    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            Direction::Toward
        } else {
            Direction::Away
        }
    }

    /// Firmware binary encoding.
    #[inline]
    pub fn bit(self) -> u8 {
        match self {
            Direction::Toward => 0,
            Direction::Away => 1,
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Toward => -1,
            Direction::Away => 1,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Toward => Direction::Away,
            Direction::Away => Direction::Toward,
        }
    }

    /// DIR pin level for this direction; away is high unless inverted.
    #[inline]
    pub fn pin_state(self, invert: bool) -> PinState {
        PinState::from((self == Direction::Away) != invert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_state() {
        assert_eq!(Direction::Away.pin_state(false), PinState::High);
        assert_eq!(Direction::Toward.pin_state(false), PinState::Low);
        assert_eq!(Direction::Away.pin_state(true), PinState::Low);
        assert_eq!(Direction::Toward.pin_state(true), PinState::High);
    }

    #[test]
    fn test_bits() {
        assert_eq!(Direction::from_bit(0), Direction::Toward);
        assert_eq!(Direction::from_bit(1), Direction::Away);
        assert_eq!(Direction::Away.bit(), 1);
        assert_eq!(Direction::Toward.reversed(), Direction::Away);
        assert_eq!(Direction::Toward.sign(), -1);
    }
}
