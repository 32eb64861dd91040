//! Unit types for positions.
//!
//! Step-counted and sensor-derived quantities live side by side in the
//! position tracker; distinct types keep them from being mixed up before
//! the sensor scale has been applied.

use core::ops::{Add, Neg, Sub};

use serde::Deserialize;

/// Motor position in steps (absolute from origin).
///
/// Uses i64 for unlimited range in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct Steps(pub i64);

impl Steps {
    /// Zero steps.
    pub const ZERO: Self = Self(0);

    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Get absolute value as u64.
    #[inline]
    pub fn abs(self) -> u64 {
        self.0.unsigned_abs()
    }
}

impl Add for Steps {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Steps {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Steps {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

/// Raw, unwrapped sensor position in sensor counts.
///
/// `revolutions * counts_per_revolution + accumulated_delta`, before the
/// steps-per-count scale is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SensorCounts(pub i64);

impl SensorCounts {
    /// Create a new SensorCounts value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Convert to steps, truncating toward zero.
    #[inline]
    pub fn to_steps(self, steps_per_count: f32) -> Steps {
        Steps(libm::trunc(self.0 as f64 * steps_per_count as f64) as i64)
    }
}

impl Sub for SensorCounts {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_to_steps() {
        assert_eq!(SensorCounts(1024).to_steps(3.125), Steps(3200));
        assert_eq!(SensorCounts(416).to_steps(3.125), Steps(1300));
    }

    #[test]
    fn test_counts_to_steps_truncates_toward_zero() {
        // 3 * 3.125 = 9.375
        assert_eq!(SensorCounts(3).to_steps(3.125), Steps(9));
        assert_eq!(SensorCounts(-3).to_steps(3.125), Steps(-9));
    }

    #[test]
    fn test_steps_arithmetic() {
        assert_eq!(Steps(5) + Steps(3), Steps(8));
        assert_eq!(Steps(5) - Steps(8), Steps(-3));
        assert_eq!(-Steps(4), Steps(-4));
        assert_eq!(Steps(-7).abs(), 7);
    }
}
