//! Builder pattern for StepperMotor.

use embedded_hal::digital::OutputPin;

use crate::config::{DeviationConfig, MotorConfig, SensorConfig, SystemConfig, TravelLimits};
use crate::config::DEFAULT_RAMP_THRESHOLD;
use crate::drive::DriveOwner;
use crate::error::{ConfigError, Error, MotorError, Result};
use crate::hal::{NoSensor, PositionSensor};

use super::deviation::DeviationMonitor;
use super::driver::StepperMotor;
use super::position::PositionTracker;
use super::role::{Master, Slave};

/// Builder for creating StepperMotor instances.
///
/// Motors without an encoder can skip [`sensor`](Self::sensor); they get a
/// [`NoSensor`].
pub struct StepperMotorBuilder<STEP, DIR, SENSOR = NoSensor>
where
    STEP: OutputPin,
    DIR: OutputPin,
    SENSOR: PositionSensor,
{
    step_pin: Option<STEP>,
    dir_pin: Option<DIR>,
    sensor: SENSOR,
    name: Option<heapless::String<32>>,
    limits: TravelLimits,
    ramp_threshold: u32,
    invert_direction: bool,
    slave_inverted: bool,
    sensor_config: SensorConfig,
    deviation: DeviationConfig,
}

impl<STEP, DIR> Default for StepperMotorBuilder<STEP, DIR, NoSensor>
where
    STEP: OutputPin,
    DIR: OutputPin,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<STEP, DIR> StepperMotorBuilder<STEP, DIR, NoSensor>
where
    STEP: OutputPin,
    DIR: OutputPin,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            step_pin: None,
            dir_pin: None,
            sensor: NoSensor::default(),
            name: None,
            limits: TravelLimits::default(),
            ramp_threshold: DEFAULT_RAMP_THRESHOLD,
            invert_direction: false,
            slave_inverted: false,
            sensor_config: SensorConfig::default(),
            deviation: DeviationConfig::default(),
        }
    }
}

impl<STEP, DIR, SENSOR> StepperMotorBuilder<STEP, DIR, SENSOR>
where
    STEP: OutputPin,
    DIR: OutputPin,
    SENSOR: PositionSensor,
{
    /// Set the STEP pin.
    pub fn step_pin(mut self, pin: STEP) -> Self {
        self.step_pin = Some(pin);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the position sensor.
    pub fn sensor<S2: PositionSensor>(self, sensor: S2) -> StepperMotorBuilder<STEP, DIR, S2> {
        StepperMotorBuilder {
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            sensor,
            name: self.name,
            limits: self.limits,
            ramp_threshold: self.ramp_threshold,
            invert_direction: self.invert_direction,
            slave_inverted: self.slave_inverted,
            sensor_config: self.sensor_config,
            deviation: self.deviation,
        }
    }

    /// Set the motor name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = heapless::String::try_from(name).ok();
        self
    }

    /// Set the soft travel limits.
    pub fn limits(mut self, limits: TravelLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the far travel boundary, keeping the current margin.
    pub fn max_angle(mut self, max_angle: i64) -> Self {
        self.limits.max_angle = max_angle;
        self
    }

    /// Set the ramp bookkeeping threshold.
    pub fn ramp_threshold(mut self, steps: u32) -> Self {
        self.ramp_threshold = steps;
        self
    }

    /// Set direction inversion for the DIR pin wiring.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// When built as a slave, run opposite to the master.
    pub fn slave_inverted(mut self, inverted: bool) -> Self {
        self.slave_inverted = inverted;
        self
    }

    /// Set the position sensor calibration.
    pub fn sensor_config(mut self, config: SensorConfig) -> Self {
        self.sensor_config = config;
        self
    }

    /// Set the deviation check.
    pub fn deviation(mut self, config: DeviationConfig) -> Self {
        self.deviation = config;
        self
    }

    /// Configure from a MotorConfig.
    pub fn from_motor_config(mut self, config: &MotorConfig) -> Self {
        self.name = Some(config.name.clone());
        self.limits = config.limits();
        self.ramp_threshold = config.ramp_threshold;
        self.invert_direction = config.invert_direction;
        self.slave_inverted = config.slave_inverted;
        self.sensor_config = config.sensor;
        self.deviation = config.deviation;
        self
    }

    /// Configure from SystemConfig by motor name.
    pub fn from_config(self, config: &SystemConfig, motor_name: &str) -> Result<Self> {
        let motor_config = config.motor(motor_name).ok_or_else(|| {
            Error::Config(ConfigError::MotorNotFound(
                heapless::String::try_from(motor_name).unwrap_or_default(),
            ))
        })?;

        Ok(self.from_motor_config(motor_config))
    }

    /// Build a master motor holding `owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if a pin is missing or the first sensor read fails.
    pub fn build<'a>(
        self,
        owner: DriveOwner<'a>,
    ) -> Result<StepperMotor<STEP, DIR, SENSOR, Master<'a>>> {
        let parts = self.into_parts()?;
        StepperMotor::new(
            parts.step_pin,
            parts.dir_pin,
            parts.sensor,
            PositionTracker::new(parts.sensor_config),
            parts.limits,
            parts.ramp_threshold,
            parts.invert_direction,
            DeviationMonitor::new(parts.deviation),
            parts.name,
            owner,
        )
    }

    /// Build a slave following `master`.
    ///
    /// # Errors
    ///
    /// Returns an error if a pin is missing or the first sensor read fails.
    pub fn build_slave<'m, S2, D2, E2>(
        self,
        master: &StepperMotor<S2, D2, E2, Master<'m>>,
    ) -> Result<StepperMotor<STEP, DIR, SENSOR, Slave<'m>>>
    where
        S2: OutputPin,
        D2: OutputPin,
        E2: PositionSensor,
    {
        let params = master.owner().params();
        let invert = self.slave_inverted;
        let parts = self.into_parts()?;
        StepperMotor::new_slave(
            parts.step_pin,
            parts.dir_pin,
            parts.sensor,
            PositionTracker::new(parts.sensor_config),
            parts.limits,
            parts.ramp_threshold,
            parts.invert_direction,
            DeviationMonitor::new(parts.deviation),
            parts.name,
            params,
            invert,
        )
    }

    fn into_parts(self) -> Result<Parts<STEP, DIR, SENSOR>> {
        let step_pin = self
            .step_pin
            .ok_or(Error::Motor(MotorError::MissingComponent("step_pin")))?;
        let dir_pin = self
            .dir_pin
            .ok_or(Error::Motor(MotorError::MissingComponent("dir_pin")))?;
        let name = self
            .name
            .unwrap_or_else(|| heapless::String::try_from("motor").unwrap_or_default());

        Ok(Parts {
            step_pin,
            dir_pin,
            sensor: self.sensor,
            name,
            limits: self.limits,
            ramp_threshold: self.ramp_threshold,
            invert_direction: self.invert_direction,
            sensor_config: self.sensor_config,
            deviation: self.deviation,
        })
    }
}

struct Parts<STEP, DIR, SENSOR> {
    step_pin: STEP,
    dir_pin: DIR,
    sensor: SENSOR,
    name: heapless::String<32>,
    limits: TravelLimits,
    ramp_threshold: u32,
    invert_direction: bool,
    sensor_config: SensorConfig,
    deviation: DeviationConfig,
}
