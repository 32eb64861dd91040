//! Property tests for position tracking and the drive engine.

mod common;

use common::Axis;
use proptest::prelude::*;
use stepper_drive::config::SensorConfig;
use stepper_drive::{
    Direction, DriveParameters, DriveStatus, Follower, PositionTracker, SensorCounts,
    StepperMotorBuilder, Steps,
};

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Toward), Just(Direction::Away)]
}

proptest! {
    /// Any walk in sub-threshold increments unwraps to the true displacement.
    #[test]
    fn sensor_walk_unwraps(
        start in 0u16..1024,
        moves in prop::collection::vec(-99i64..=99, 0..400),
    ) {
        let mut tracker = PositionTracker::new(SensorConfig::default());
        tracker.reset(start);

        let mut reading = start as i64;
        for delta in &moves {
            reading = (reading + delta).rem_euclid(1024);
            tracker.update_sensor(reading as u16);
        }

        prop_assert_eq!(tracker.sensor_counts(), SensorCounts(moves.iter().sum()));
    }

    /// The step count equals the signed sum of executed moves.
    #[test]
    fn steps_follow_commands(moves in prop::collection::vec((0u32..40, direction()), 1..20)) {
        let axis = Axis::at(0);
        let params = DriveParameters::new();
        let mut motor = StepperMotorBuilder::new()
            .step_pin(axis.step_pin())
            .dir_pin(axis.dir_pin())
            .build(params.claim().unwrap())
            .unwrap();
        motor.override_on();

        let mut now = 0u32;
        let mut expected = 0i64;
        for (steps, dir) in &moves {
            prop_assert!(motor.set_drive(*steps, *dir, 3, 0));
            while !params.is_idle() {
                now += 1;
                motor.drive_tick(now).unwrap();
            }
            expected += *steps as i64 * dir.sign();
        }

        prop_assert_eq!(motor.absolute_steps(), Steps(expected));
        prop_assert_eq!(axis.position(), expected);
    }

    /// Slaves ticked before the master issue exactly the master's pulses.
    #[test]
    fn slave_tracks_master(
        moves in prop::collection::vec((0u32..30, direction()), 1..10),
        inverted in any::<bool>(),
    ) {
        let master_axis = Axis::at(0);
        let slave_axis = Axis::at(0);
        let params = DriveParameters::new();
        let mut motor = StepperMotorBuilder::new()
            .step_pin(master_axis.step_pin())
            .dir_pin(master_axis.dir_pin())
            .build(params.claim().unwrap())
            .unwrap();
        let mut slave = StepperMotorBuilder::new()
            .slave_inverted(inverted)
            .step_pin(slave_axis.step_pin())
            .dir_pin(slave_axis.dir_pin())
            .build_slave(&motor)
            .unwrap();
        motor.override_on();

        let mut now = 0u32;
        {
            let mut followers: [&mut dyn Follower; 1] = [&mut slave];
            for (steps, dir) in &moves {
                motor.set_drive(*steps, *dir, 2, 0);
                while !params.is_idle() {
                    now += 1;
                    motor.drive_axis(now, &mut followers).unwrap();
                }
            }
        }

        prop_assert_eq!(slave.absolute_steps(), motor.absolute_steps());
        let sign = if inverted { -1 } else { 1 };
        prop_assert_eq!(slave_axis.position(), sign * master_axis.position());
    }

    /// A slave polled on its own schedule ends every move where the master does.
    #[test]
    fn slave_matches_master_at_any_poll_rate(
        moves in prop::collection::vec((0u32..30, direction()), 1..6),
        slave_polls in 0u32..4,
    ) {
        let master_axis = Axis::at(0);
        let slave_axis = Axis::at(0);
        let params = DriveParameters::new();
        let mut motor = StepperMotorBuilder::new()
            .step_pin(master_axis.step_pin())
            .dir_pin(master_axis.dir_pin())
            .build(params.claim().unwrap())
            .unwrap();
        let mut slave = StepperMotorBuilder::new()
            .step_pin(slave_axis.step_pin())
            .dir_pin(slave_axis.dir_pin())
            .build_slave(&motor)
            .unwrap();
        motor.override_on();

        let mut now = 0u32;
        for (steps, dir) in &moves {
            motor.set_drive(*steps, *dir, 2, 0);
            while !params.is_idle() {
                now += 1;
                motor.drive_tick(now).unwrap();
                for _ in 0..slave_polls {
                    slave.drive_tick(now).unwrap();
                }
            }
            // Let the slave finish before the next command replaces this one
            for _ in 0..64 {
                now += 1;
                slave.drive_tick(now).unwrap();
            }
            prop_assert_eq!(slave_axis.position(), master_axis.position());
        }
    }

    /// A rejected command moves nothing and leaves the drive stopped.
    #[test]
    fn rejected_command_stops(start in 0u32..200, steps in 0u32..60_000, dir in direction()) {
        let axis = Axis::at(0);
        let params = DriveParameters::new();
        let mut motor = StepperMotorBuilder::new()
            .step_pin(axis.step_pin())
            .dir_pin(axis.dir_pin())
            .build(params.claim().unwrap())
            .unwrap();

        motor.override_on();
        motor.set_drive(start, Direction::Away, 1, 0);
        let mut now = 0;
        while !params.is_idle() {
            now += 1;
            motor.drive_tick(now).unwrap();
        }
        motor.override_off();

        let position = motor.absolute_steps();
        let permits = motor.limits().permits(position, steps, dir);
        prop_assert_eq!(motor.set_drive(steps, dir, 1, 0), permits);
        if !permits {
            prop_assert_eq!(params.status(), DriveStatus::Overlimit);
            prop_assert!(params.is_idle());
            prop_assert!(!motor.drive_tick(now + 10).unwrap());
            prop_assert_eq!(motor.absolute_steps(), position);
        }
    }
}
