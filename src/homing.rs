//! Limit-switch homing.
//!
//! Homing runs in three stages on the master's poll loop:
//!
//! 1. **Seek**: drive toward the switch until it triggers, then zero.
//! 2. **Clear**: back away until the axis is past the clear distance.
//! 3. **Approach**: return slowly until the switch triggers again, then zero.
//!
//! Soft limits are overridden for the whole sequence. Every poll re-arms a
//! short move, so the axis only keeps moving while it is polled.
//!
//! [`HomingController::poll`] advances the sequence by one drive tick and
//! never blocks. [`HomingController::run_to_completion`] loops on it.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::HomingConfig;
use crate::drive::{Direction, DriveStatus};
use crate::error::{MotorError, Result};
use crate::hal::{Clock, PositionSensor};
use crate::motor::{Follower, Master, StepperMotor};

/// Stage of an active homing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingStage {
    /// Driving toward the limit switch.
    SeekLimit,
    /// Backing away from the switch.
    ClearLimit,
    /// Slow final approach to the switch.
    ApproachLimit,
}

/// Outcome of one homing poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingProgress {
    /// Still running, in the given stage.
    InProgress(HomingStage),
    /// Zeroed at the switch; the drive is `Ready`.
    Homed,
    /// Gave up; the drive is stopped with status `HomingTimeout`.
    TimedOut,
}

impl HomingProgress {
    /// Whether the sequence has ended, successfully or not.
    pub fn is_finished(self) -> bool {
        !matches!(self, HomingProgress::InProgress(_))
    }
}

/// Homing state machine for one axis, owning its limit switch input.
pub struct HomingController<LIMIT: InputPin> {
    limit: LIMIT,
    config: HomingConfig,
    stage: HomingStage,
    started_at: Option<u32>,
}

impl<LIMIT: InputPin> HomingController<LIMIT> {
    /// Create an idle controller.
    pub fn new(limit: LIMIT, config: HomingConfig) -> Self {
        Self {
            limit,
            config,
            stage: HomingStage::SeekLimit,
            started_at: None,
        }
    }

    /// Homing parameters.
    pub fn config(&self) -> &HomingConfig {
        &self.config
    }

    /// Current stage. Meaningful only while [`is_active`](Self::is_active).
    pub fn stage(&self) -> HomingStage {
        self.stage
    }

    /// Whether a sequence is running.
    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Release the limit switch input.
    pub fn release(self) -> LIMIT {
        self.limit
    }

    /// Read the limit switch.
    pub fn limit_triggered(&mut self) -> Result<bool> {
        let high = self.limit.is_high().map_err(|_| MotorError::PinError)?;
        Ok(high == self.config.limit_active_high)
    }

    /// Begin (or restart) homing at time `now`.
    ///
    /// Turns override on and sets the drive status to `Homing`.
    pub fn start<S, D, E>(&mut self, master: &mut StepperMotor<S, D, E, Master<'_>>, now: u32)
    where
        S: OutputPin,
        D: OutputPin,
        E: PositionSensor,
    {
        master.override_on();
        master.owner().set_status(DriveStatus::Homing);
        master.refresh_snapshot();
        self.stage = HomingStage::SeekLimit;
        self.started_at = Some(now);
        info!("{}: homing started", master.name());
    }

    /// Advance homing by one poll.
    ///
    /// Starts a sequence if none is active. Followers are ticked with the
    /// master and zeroed alongside it.
    pub fn poll<S, D, E, C>(
        &mut self,
        master: &mut StepperMotor<S, D, E, Master<'_>>,
        followers: &mut [&mut dyn Follower],
        clock: &C,
    ) -> Result<HomingProgress>
    where
        S: OutputPin,
        D: OutputPin,
        E: PositionSensor,
        C: Clock + ?Sized,
    {
        let now = clock.now();
        let started_at = match self.started_at {
            Some(at) => at,
            None => {
                self.start(master, now);
                now
            }
        };

        if let Some(timeout) = self.config.timeout_us() {
            if now.wrapping_sub(started_at) >= timeout {
                return Ok(self.time_out(master));
            }
        }

        let triggered = self.limit_triggered()?;
        // A poll that changes stage does not drive
        match self.stage {
            HomingStage::SeekLimit => {
                if triggered {
                    Self::zero(master, followers)?;
                    self.stage = HomingStage::ClearLimit;
                    info!("{}: limit found, clearing", master.name());
                    return Ok(HomingProgress::InProgress(self.stage));
                }
                master.set_drive(
                    self.config.seek_steps,
                    Direction::Toward,
                    self.config.seek_interval_us,
                    0,
                );
            }
            HomingStage::ClearLimit => {
                if master.absolute_steps().0 > self.config.clear_distance_steps {
                    self.stage = HomingStage::ApproachLimit;
                    info!("{}: limit cleared, approaching", master.name());
                    return Ok(HomingProgress::InProgress(self.stage));
                }
                master.set_drive(
                    self.config.seek_steps,
                    Direction::Away,
                    self.config.seek_interval_us,
                    0,
                );
            }
            HomingStage::ApproachLimit => {
                if triggered {
                    self.finish(master, followers)?;
                    return Ok(HomingProgress::Homed);
                }
                master.set_drive(
                    self.config.seek_steps,
                    Direction::Toward,
                    self.config.approach_interval_us,
                    0,
                );
            }
        }

        master.drive_axis(now, followers)?;
        Ok(HomingProgress::InProgress(self.stage))
    }

    /// Restart homing and poll until it ends.
    ///
    /// With the timeout disabled this only returns once the switch has been
    /// found twice.
    pub fn run_to_completion<S, D, E, C>(
        &mut self,
        master: &mut StepperMotor<S, D, E, Master<'_>>,
        followers: &mut [&mut dyn Follower],
        clock: &C,
    ) -> Result<HomingProgress>
    where
        S: OutputPin,
        D: OutputPin,
        E: PositionSensor,
        C: Clock + ?Sized,
    {
        self.start(master, clock.now());
        loop {
            let progress = self.poll(master, followers, clock)?;
            if progress.is_finished() {
                return Ok(progress);
            }
        }
    }

    fn zero<S, D, E>(
        master: &mut StepperMotor<S, D, E, Master<'_>>,
        followers: &mut [&mut dyn Follower],
    ) -> Result<()>
    where
        S: OutputPin,
        D: OutputPin,
        E: PositionSensor,
    {
        master.reset_position()?;
        for follower in followers.iter_mut() {
            follower.reset_position()?;
        }
        Ok(())
    }

    fn finish<S, D, E>(
        &mut self,
        master: &mut StepperMotor<S, D, E, Master<'_>>,
        followers: &mut [&mut dyn Follower],
    ) -> Result<()>
    where
        S: OutputPin,
        D: OutputPin,
        E: PositionSensor,
    {
        Self::zero(master, followers)?;
        master.override_off();
        master.owner().set_status(DriveStatus::Ready);
        master.refresh_snapshot();
        self.started_at = None;
        info!("{}: homed", master.name());
        Ok(())
    }

    fn time_out<S, D, E>(
        &mut self,
        master: &mut StepperMotor<S, D, E, Master<'_>>,
    ) -> HomingProgress
    where
        S: OutputPin,
        D: OutputPin,
        E: PositionSensor,
    {
        master.all_stop();
        master.override_off();
        master.owner().set_status(DriveStatus::HomingTimeout);
        master.refresh_snapshot();
        self.started_at = None;
        error!("{}: homing timed out in {}", master.name(), self.stage);
        HomingProgress::TimedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::DriveParameters;
    use crate::motor::StepperMotorBuilder;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct NullPin;

    impl ErrorType for NullPin {
        type Error = Infallible;
    }

    impl OutputPin for NullPin {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }
        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }
    }

    struct Level(bool);

    impl ErrorType for Level {
        type Error = Infallible;
    }

    impl InputPin for Level {
        fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(self.0)
        }
        fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    #[test]
    fn test_start_sets_homing() {
        let params = DriveParameters::new();
        let mut motor = StepperMotorBuilder::new()
            .step_pin(NullPin)
            .dir_pin(NullPin)
            .build(params.claim().unwrap())
            .unwrap();
        let t = Cell::new(0u32);
        let clock = || t.get();

        let mut homing = HomingController::new(Level(false), HomingConfig::default());
        assert!(!homing.is_active());

        let progress = homing.poll(&mut motor, &mut [], &clock).unwrap();
        assert_eq!(progress, HomingProgress::InProgress(HomingStage::SeekLimit));
        assert!(homing.is_active());
        assert_eq!(params.status(), DriveStatus::Homing);
        assert!(params.override_active());
        assert_eq!(params.direction(), Direction::Toward);
        assert_eq!(motor.snapshot().status, DriveStatus::Homing);
    }

    #[test]
    fn test_timeout() {
        let params = DriveParameters::new();
        let mut motor = StepperMotorBuilder::new()
            .step_pin(NullPin)
            .dir_pin(NullPin)
            .build(params.claim().unwrap())
            .unwrap();
        let t = Cell::new(0u32);
        let clock = || t.get();

        let config = HomingConfig {
            timeout_ms: 2,
            ..HomingConfig::default()
        };
        let mut homing = HomingController::new(Level(false), config);

        homing.poll(&mut motor, &mut [], &clock).unwrap();
        t.set(1999);
        assert!(!homing.poll(&mut motor, &mut [], &clock).unwrap().is_finished());

        t.set(2000);
        assert_eq!(
            homing.poll(&mut motor, &mut [], &clock).unwrap(),
            HomingProgress::TimedOut
        );
        assert!(!homing.is_active());
        assert_eq!(params.status(), DriveStatus::HomingTimeout);
        assert!(!params.override_active());
        assert!(params.is_idle());

        assert_eq!(motor.acknowledge_fault(), DriveStatus::NoHome);
    }

    struct Switch<'a>(&'a Cell<bool>);

    impl ErrorType for Switch<'_> {
        type Error = Infallible;
    }

    impl InputPin for Switch<'_> {
        fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(self.0.get())
        }
        fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(!self.0.get())
        }
    }

    #[test]
    fn test_stage_change_does_not_step() {
        let params = DriveParameters::new();
        let mut motor = StepperMotorBuilder::new()
            .step_pin(NullPin)
            .dir_pin(NullPin)
            .build(params.claim().unwrap())
            .unwrap();
        let t = Cell::new(0u32);
        let clock = || t.get();
        let switch = Cell::new(true);

        let config = HomingConfig {
            seek_interval_us: 10,
            clear_distance_steps: 3,
            ..HomingConfig::default()
        };
        let mut homing = HomingController::new(Switch(&switch), config);

        // Switch already closed: zero and move on without stepping
        t.set(10);
        assert_eq!(
            homing.poll(&mut motor, &mut [], &clock).unwrap(),
            HomingProgress::InProgress(HomingStage::ClearLimit)
        );
        assert_eq!(motor.absolute_steps().0, 0);

        switch.set(false);
        let mut progress = HomingProgress::InProgress(HomingStage::ClearLimit);
        while progress == HomingProgress::InProgress(HomingStage::ClearLimit) {
            t.set(t.get() + 10);
            progress = homing.poll(&mut motor, &mut [], &clock).unwrap();
        }

        // The poll that clears the distance does not run the Away command
        assert_eq!(progress, HomingProgress::InProgress(HomingStage::ApproachLimit));
        assert_eq!(motor.absolute_steps().0, 4);

        t.set(t.get() + config.approach_interval_us);
        homing.poll(&mut motor, &mut [], &clock).unwrap();
        assert_eq!(motor.absolute_steps().0, 3);
    }

    #[test]
    fn test_active_low_switch() {
        let config = HomingConfig {
            limit_active_high: false,
            ..HomingConfig::default()
        };
        let mut homing = HomingController::new(Level(false), config);
        assert!(homing.limit_triggered().unwrap());

        let mut homing = HomingController::new(Level(true), config);
        assert!(!homing.limit_triggered().unwrap());
    }
}
