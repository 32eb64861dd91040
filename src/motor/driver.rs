//! Stepper motor drive engine.
//!
//! Generic over embedded-hal 1.0 pin types, the position sensor, and the
//! motor's [`Role`]. Each [`drive_tick`](StepperMotor::drive_tick) call emits
//! at most one STEP edge and never blocks.

use embedded_hal::digital::{OutputPin, PinState};

use crate::config::units::Steps;
use crate::config::TravelLimits;
use crate::drive::{Direction, DriveOwner, DriveParameters, DriveSnapshot, DriveStatus};
use crate::error::{MotorError, Result};
use crate::hal::PositionSensor;

use super::deviation::DeviationMonitor;
use super::position::PositionTracker;
use super::role::{Follower, Master, Role, Slave};

/// Stepper motor driver with a type-state role.
///
/// Generic over:
/// - `STEP`: STEP pin type (must implement `OutputPin`)
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `SENSOR`: Analog position sensor (must implement `PositionSensor`)
/// - `ROLE`: [`Master`] or [`Slave`]
pub struct StepperMotor<STEP, DIR, SENSOR, ROLE>
where
    STEP: OutputPin,
    DIR: OutputPin,
    SENSOR: PositionSensor,
    ROLE: Role,
{
    /// STEP pin (toggled once per pulse).
    step_pin: STEP,

    /// DIR pin.
    dir_pin: DIR,

    /// Analog position sensor.
    sensor: SENSOR,

    /// Step-counted and sensor-derived positions.
    tracker: PositionTracker,

    /// Soft travel limits checked by `set_drive`.
    limits: TravelLimits,

    /// Ramp bookkeeping threshold in queued steps.
    ramp_threshold: u32,

    /// Whether DIR pin logic is inverted by the wiring.
    invert_direction: bool,

    /// Step/sensor deviation check.
    deviation: DeviationMonitor,

    /// Level written on the next STEP edge.
    step_level: PinState,

    /// Last DIR level written (cached to avoid unnecessary pin writes).
    dir_level: Option<PinState>,

    /// Clock value at the last pulse.
    last_pulse: u32,

    /// Status record for the reporting layer.
    snapshot: DriveSnapshot,

    /// Motor name for logging/debugging.
    name: heapless::String<32>,

    /// Master or slave.
    role: ROLE,
}

impl<STEP, DIR, SENSOR, ROLE> StepperMotor<STEP, DIR, SENSOR, ROLE>
where
    STEP: OutputPin,
    DIR: OutputPin,
    SENSOR: PositionSensor,
    ROLE: Role,
{
    /// Get the motor name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Get the role name.
    #[inline]
    pub fn role_name(&self) -> &'static str {
        ROLE::name()
    }

    /// The drive parameters this motor executes.
    #[inline]
    pub fn params(&self) -> &DriveParameters {
        self.role.params()
    }

    /// Current drive status.
    #[inline]
    pub fn status(&self) -> DriveStatus {
        self.role.params().status()
    }

    /// Pulses issued since the last position reset.
    #[inline]
    pub fn absolute_steps(&self) -> Steps {
        self.tracker.absolute_steps()
    }

    /// Position relative to the work offset.
    #[inline]
    pub fn work_offset_steps(&self) -> Steps {
        self.tracker.work_offset_steps()
    }

    /// Sensor-derived absolute position, in steps.
    #[inline]
    pub fn sensor_absolute(&self) -> Steps {
        self.tracker.sensor_absolute()
    }

    /// Sensor-derived position relative to the sensor work offset, in steps.
    #[inline]
    pub fn sensor_work_offset(&self) -> Steps {
        self.tracker.sensor_work_offset()
    }

    /// Get the position tracker.
    #[inline]
    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    /// Get the soft travel limits.
    #[inline]
    pub fn limits(&self) -> &TravelLimits {
        &self.limits
    }

    /// Get the deviation monitor.
    #[inline]
    pub fn deviation_monitor(&self) -> &DeviationMonitor {
        &self.deviation
    }

    /// Get the deviation monitor for runtime enabling.
    #[inline]
    pub fn deviation_monitor_mut(&mut self) -> &mut DeviationMonitor {
        &mut self.deviation
    }

    /// Latest status snapshot.
    #[inline]
    pub fn snapshot(&self) -> DriveSnapshot {
        self.snapshot
    }

    /// Refresh every field of the status snapshot.
    pub fn refresh_snapshot(&mut self) -> DriveSnapshot {
        self.snapshot = DriveSnapshot {
            absolute_steps: self.tracker.absolute_steps(),
            work_offset_steps: self.tracker.work_offset_steps(),
            status: self.role.params().status(),
            drive_ready: self.role.params().is_idle(),
        };
        self.snapshot
    }

    /// Read the position sensor and fold the reading into the tracker.
    ///
    /// Returns the change in whole sensor revolutions.
    pub fn enc_update(&mut self) -> Result<i64> {
        let reading = self.read_sensor()?;
        let wrapped = self.tracker.update_sensor(reading);
        if wrapped != 0 {
            trace!(
                "sensor wrap {} -> {} revolutions",
                wrapped,
                self.tracker.revolutions()
            );
        }
        Ok(wrapped)
    }

    /// Capture the current position as the logical zero of both the step and
    /// sensor views.
    pub fn update_work_offset(&mut self) {
        self.tracker.capture_work_offset();
        self.snapshot.work_offset_steps = self.tracker.work_offset_steps();
    }

    fn read_sensor(&mut self) -> Result<u16> {
        let reading = self.sensor.read().map_err(|_| MotorError::SensorError)?;
        if reading > self.tracker.calibration().max_reading() {
            return Err(MotorError::SensorOutOfRange(reading).into());
        }
        Ok(reading)
    }

    /// Whether the commanded interval has elapsed since the last pulse.
    fn interval_elapsed(&self, now: u32) -> bool {
        now.wrapping_sub(self.last_pulse) >= self.role.params().step_interval()
    }

    /// Drive DIR, refresh the snapshot, toggle STEP and count the pulse.
    fn emit_pulse(&mut self, now: u32) -> Result<()> {
        let direction = self.role.params().direction();
        let level = direction.pin_state(self.invert_direction != self.role.inverts_direction());
        if self.dir_level != Some(level) {
            self.dir_pin
                .set_state(level)
                .map_err(|_| MotorError::PinError)?;
            self.dir_level = Some(level);
        }

        self.snapshot.absolute_steps = self.tracker.absolute_steps();
        self.snapshot.work_offset_steps = self.tracker.work_offset_steps();

        self.step_pin
            .set_state(self.step_level)
            .map_err(|_| MotorError::PinError)?;
        self.step_level = !self.step_level;
        self.last_pulse = now;

        self.tracker.advance(direction);
        Ok(())
    }

    fn reseed_tracker(&mut self) -> Result<()> {
        let reading = self.read_sensor()?;
        self.tracker.reset(reading);
        Ok(())
    }

    fn into_role<R: Role>(self, role: R) -> StepperMotor<STEP, DIR, SENSOR, R> {
        StepperMotor {
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            sensor: self.sensor,
            tracker: self.tracker,
            limits: self.limits,
            ramp_threshold: self.ramp_threshold,
            invert_direction: self.invert_direction,
            deviation: self.deviation,
            step_level: self.step_level,
            dir_level: self.dir_level,
            last_pulse: self.last_pulse,
            snapshot: self.snapshot,
            name: self.name,
            role,
        }
    }
}

impl<'a, STEP, DIR, SENSOR> StepperMotor<STEP, DIR, SENSOR, Master<'a>>
where
    STEP: OutputPin,
    DIR: OutputPin,
    SENSOR: PositionSensor,
{
    /// Create a master motor. The tracker is seeded from a first sensor read.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        step_pin: STEP,
        dir_pin: DIR,
        sensor: SENSOR,
        tracker: PositionTracker,
        limits: TravelLimits,
        ramp_threshold: u32,
        invert_direction: bool,
        deviation: DeviationMonitor,
        name: heapless::String<32>,
        owner: DriveOwner<'a>,
    ) -> Result<Self> {
        let mut motor = Self {
            step_pin,
            dir_pin,
            sensor,
            tracker,
            limits,
            ramp_threshold,
            invert_direction,
            deviation,
            step_level: PinState::High,
            dir_level: None,
            last_pulse: 0,
            snapshot: DriveSnapshot::default(),
            name,
            role: Master { owner },
        };
        motor.reseed_tracker()?;
        motor.refresh_snapshot();
        Ok(motor)
    }

    /// The write capability of this motor's drive parameters.
    #[inline]
    pub fn owner(&self) -> &DriveOwner<'a> {
        &self.role.owner
    }

    /// Queue a move.
    ///
    /// Without override, a move that would end within the limit margin of
    /// either travel boundary is rejected: the status becomes `Overlimit`
    /// and the drive is stopped. Returns whether the command was accepted.
    pub fn set_drive(
        &mut self,
        steps: u32,
        direction: Direction,
        step_interval: u32,
        ramp: u32,
    ) -> bool {
        let owner = &self.role.owner;
        let position = self.tracker.absolute_steps();
        if !owner.params().override_active() && !self.limits.permits(position, steps, direction) {
            warn!(
                "{}: rejected {} steps {} from {}",
                self.name.as_str(),
                steps,
                direction,
                position.0
            );
            owner.set_status(DriveStatus::Overlimit);
            owner.all_stop();
            return false;
        }

        owner.command(steps, direction, step_interval, ramp);
        true
    }

    /// Zero steps, direction, interval and ramp. Status is left alone.
    pub fn all_stop(&mut self) {
        self.role.owner.all_stop();
    }

    /// Bypass soft limits and status gating.
    pub fn override_on(&mut self) {
        self.role.owner.override_on();
    }

    /// Restore soft limits and status gating.
    pub fn override_off(&mut self) {
        self.role.owner.override_off();
    }

    /// Clear a fault status; see [`DriveOwner::acknowledge_fault`].
    pub fn acknowledge_fault(&mut self) -> DriveStatus {
        self.role.owner.acknowledge_fault()
    }

    /// Poll the drive and pulse if a step is due.
    ///
    /// This must be called at least once per step interval. Each call makes
    /// at most one pulse, and only when the interval since the previous pulse
    /// has elapsed, steps are queued, and the status allows motion (or
    /// override is active). Returns whether a pulse was emitted.
    pub fn drive_tick(&mut self, now: u32) -> Result<bool> {
        let params = self.role.owner.params();
        if params.is_idle() && params.status() == DriveStatus::Driving {
            self.role.owner.set_status(DriveStatus::Ready);
            debug!("{}: move complete", self.name.as_str());
        }

        if !params.may_pulse() || !self.interval_elapsed(now) {
            return Ok(false);
        }

        if params.status() != DriveStatus::Homing {
            self.role.owner.set_status(DriveStatus::Driving);
        }
        self.role.owner.adjust_ramp(self.ramp_threshold);
        self.emit_pulse(now)?;
        self.role.owner.consume_step();
        Ok(true)
    }

    /// Tick every follower, then this motor, at the same instant.
    ///
    /// Followers go first so their pulse lands on the same tick as the
    /// master's.
    pub fn drive_axis(&mut self, now: u32, followers: &mut [&mut dyn Follower]) -> Result<bool> {
        for follower in followers.iter_mut() {
            follower.follow_tick(now)?;
        }
        self.drive_tick(now)
    }

    /// Zero the position, re-seed the sensor baseline and clear the command.
    ///
    /// Status, override and the work offsets are left alone.
    pub fn reset_position(&mut self) -> Result<()> {
        self.reseed_tracker()?;
        self.role.owner.all_stop();
        self.snapshot.absolute_steps = self.tracker.absolute_steps();
        self.snapshot.work_offset_steps = self.tracker.work_offset_steps();
        Ok(())
    }

    /// Compare step and sensor positions and flag a deviation.
    ///
    /// When the check is enabled and the estimates differ by more than the
    /// tolerance, the status becomes `EncoderDeviation`. The snapshot is
    /// refreshed either way. Returns whether a deviation was detected.
    pub fn check_deviation(&mut self) -> bool {
        let deviated = self.deviation.exceeds(&self.tracker);
        if deviated {
            warn!(
                "{}: encoder deviation, steps {} sensor {}",
                self.name.as_str(),
                self.tracker.absolute_steps().0,
                self.tracker.sensor_absolute().0
            );
            self.role.owner.set_status(DriveStatus::EncoderDeviation);
        }
        self.refresh_snapshot();
        deviated
    }

    /// Give up ownership and follow `master` instead.
    ///
    /// The slave's position tracker keeps counting its own pulses; commands
    /// issued through `master` are observed on the slave's next tick.
    pub fn bind_as_slave<'m, S2, D2, E2>(
        self,
        master: &StepperMotor<S2, D2, E2, Master<'m>>,
        invert: bool,
    ) -> StepperMotor<STEP, DIR, SENSOR, Slave<'m>>
    where
        S2: OutputPin,
        D2: OutputPin,
        E2: PositionSensor,
    {
        self.into_role(Slave::following(master.role.owner.params(), invert))
    }
}

impl<'a, STEP, DIR, SENSOR> StepperMotor<STEP, DIR, SENSOR, Slave<'a>>
where
    STEP: OutputPin,
    DIR: OutputPin,
    SENSOR: PositionSensor,
{
    /// Create a slave following `params`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_slave(
        step_pin: STEP,
        dir_pin: DIR,
        sensor: SENSOR,
        tracker: PositionTracker,
        limits: TravelLimits,
        ramp_threshold: u32,
        invert_direction: bool,
        deviation: DeviationMonitor,
        name: heapless::String<32>,
        params: &'a DriveParameters,
        invert: bool,
    ) -> Result<Self> {
        let mut motor = Self {
            step_pin,
            dir_pin,
            sensor,
            tracker,
            limits,
            ramp_threshold,
            invert_direction,
            deviation,
            step_level: PinState::High,
            dir_level: None,
            last_pulse: 0,
            snapshot: DriveSnapshot::default(),
            name,
            role: Slave::following(params, invert),
        };
        motor.reseed_tracker()?;
        motor.refresh_snapshot();
        Ok(motor)
    }

    /// Whether this slave's direction is the complement of the master's.
    #[inline]
    pub fn is_inverted(&self) -> bool {
        self.role.invert
    }

    /// Poll and mirror the master's command.
    ///
    /// Same timing and gating as the master's tick, but a slave never
    /// changes the shared status, ramp, or step count. A slave emits exactly
    /// the commanded number of pulses per command, however often it is
    /// ticked relative to the master. A new command or a stop discards
    /// whatever the previous command still owed.
    pub fn drive_tick(&mut self, now: u32) -> Result<bool> {
        self.role.sync();
        if !self.role.owes_pulse() || !self.interval_elapsed(now) {
            return Ok(false);
        }
        self.emit_pulse(now)?;
        self.role.mirrored += 1;
        Ok(true)
    }

    /// Zero this motor's position and re-seed its sensor baseline.
    ///
    /// The shared command belongs to the master and is left alone.
    pub fn reset_position(&mut self) -> Result<()> {
        self.reseed_tracker()?;
        self.snapshot.absolute_steps = self.tracker.absolute_steps();
        self.snapshot.work_offset_steps = self.tracker.work_offset_steps();
        Ok(())
    }

    /// Compare step and sensor positions.
    ///
    /// A slave cannot write the shared status; the caller escalates through
    /// the master. The snapshot is refreshed either way.
    pub fn check_deviation(&mut self) -> bool {
        let deviated = self.deviation.exceeds(&self.tracker);
        if deviated {
            warn!(
                "{}: encoder deviation on slave, steps {} sensor {}",
                self.name.as_str(),
                self.tracker.absolute_steps().0,
                self.tracker.sensor_absolute().0
            );
        }
        self.refresh_snapshot();
        deviated
    }
}

impl<STEP, DIR, SENSOR> Follower for StepperMotor<STEP, DIR, SENSOR, Slave<'_>>
where
    STEP: OutputPin,
    DIR: OutputPin,
    SENSOR: PositionSensor,
{
    fn follow_tick(&mut self, now: u32) -> Result<bool> {
        self.drive_tick(now)
    }

    fn reset_position(&mut self) -> Result<()> {
        Self::reset_position(self)
    }

    fn snapshot(&self) -> DriveSnapshot {
        self.snapshot
    }
}
