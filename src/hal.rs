//! External capabilities consumed by the drive engine.
//!
//! STEP/DIR outputs and the limit switch use the embedded-hal 1.0 digital
//! traits directly. embedded-hal has no analog input or free-running clock,
//! so those two seams are defined here.

use core::fmt::Debug;

/// Monotonic time source in microseconds.
///
/// The counter is allowed to wrap; every comparison in this crate uses
/// wrapping subtraction, so intervals stay correct across the wrap as long
/// as they are shorter than `u32::MAX` microseconds.
pub trait Clock {
    /// Current time in microseconds.
    fn now(&self) -> u32;
}

impl<F> Clock for F
where
    F: Fn() -> u32,
{
    #[inline]
    fn now(&self) -> u32 {
        self()
    }
}

/// Analog position sensor (one reading per revolution period).
pub trait PositionSensor {
    /// Error produced by a failed conversion.
    type Error: Debug;

    /// Read the raw sensor value, expected in `0..counts_per_revolution`.
    fn read(&mut self) -> Result<u16, Self::Error>;
}

impl<T: PositionSensor + ?Sized> PositionSensor for &mut T {
    type Error = T::Error;

    #[inline]
    fn read(&mut self) -> Result<u16, Self::Error> {
        T::read(self)
    }
}

/// Stand-in for axes without an encoder fitted.
///
/// Always reports the same reading, so the sensor-derived position never
/// moves and no revolution is ever counted.
#[derive(Debug, Clone, Copy)]
pub struct NoSensor(pub u16);

impl Default for NoSensor {
    fn default() -> Self {
        Self(512)
    }
}

impl PositionSensor for NoSensor {
    type Error = core::convert::Infallible;

    #[inline]
    fn read(&mut self) -> Result<u16, Self::Error> {
        Ok(self.0)
    }
}
