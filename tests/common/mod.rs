//! Bench rig shared by the integration tests.
//!
//! An [`Axis`] is a simulated carriage: its STEP pin moves it one step per
//! edge in the direction latched on its DIR pin, and its limit switch reads
//! high while the carriage sits at or below zero.

#![allow(dead_code)]

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use stepper_drive::PositionSensor;

#[derive(Debug, Default)]
pub struct Axis {
    pub position: Cell<i64>,
    pub dir_high: Cell<bool>,
    pub edges: Cell<u32>,
}

impl Axis {
    pub fn at(position: i64) -> Self {
        let axis = Self::default();
        axis.position.set(position);
        axis
    }

    pub fn position(&self) -> i64 {
        self.position.get()
    }

    pub fn step_pin(&self) -> StepPin<'_> {
        StepPin(self)
    }

    pub fn dir_pin(&self) -> DirPin<'_> {
        DirPin(self)
    }

    pub fn limit_pin(&self) -> LimitPin<'_> {
        LimitPin(self)
    }

    fn edge(&self) {
        self.edges.set(self.edges.get() + 1);
        let delta = if self.dir_high.get() { 1 } else { -1 };
        self.position.set(self.position.get() + delta);
    }
}

pub struct StepPin<'a>(&'a Axis);

impl ErrorType for StepPin<'_> {
    type Error = Infallible;
}

impl OutputPin for StepPin<'_> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.edge();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.edge();
        Ok(())
    }
}

pub struct DirPin<'a>(&'a Axis);

impl ErrorType for DirPin<'_> {
    type Error = Infallible;
}

impl OutputPin for DirPin<'_> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.dir_high.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.dir_high.set(true);
        Ok(())
    }
}

pub struct LimitPin<'a>(&'a Axis);

impl ErrorType for LimitPin<'_> {
    type Error = Infallible;
}

impl InputPin for LimitPin<'_> {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.position.get() <= 0)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.position.get() > 0)
    }
}

/// Encoder whose reading is set by the test.
pub struct Encoder<'a>(pub &'a Cell<u16>);

impl PositionSensor for Encoder<'_> {
    type Error = Infallible;

    fn read(&mut self) -> Result<u16, Infallible> {
        Ok(self.0.get())
    }
}

/// Microsecond clock that advances by `step` every time it is read.
pub struct SteppingClock {
    now: Cell<u32>,
    step: u32,
}

impl SteppingClock {
    pub fn new(start: u32, step: u32) -> Self {
        Self {
            now: Cell::new(start),
            step,
        }
    }

    pub fn current(&self) -> u32 {
        self.now.get()
    }
}

impl stepper_drive::Clock for SteppingClock {
    fn now(&self) -> u32 {
        let now = self.now.get().wrapping_add(self.step);
        self.now.set(now);
        now
    }
}
