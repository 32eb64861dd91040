//! Example: homing and driving a two-motor gantry.
//!
//! The right-hand motor of the gantry is mounted mirrored, so it follows the
//! left-hand master with its direction inverted. Both carriages are
//! simulated; the limit switch closes when the left carriage reaches zero.
//!
//! Run with: `cargo run --example gantry`

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use stepper_drive::config::HomingConfig;
use stepper_drive::error::Result;
use stepper_drive::{
    Direction, DriveParameters, Follower, HomingController, HomingProgress, StepperMotorBuilder,
};

/// Simulated carriage position, shared between its pins.
#[derive(Clone, Default)]
struct Carriage {
    position: Rc<Cell<i64>>,
    forward: Rc<Cell<bool>>,
}

impl Carriage {
    fn at(position: i64) -> Self {
        let carriage = Self::default();
        carriage.position.set(position);
        carriage
    }
}

/// STEP pin that moves its carriage on every edge.
struct SimStepPin(Carriage);

impl embedded_hal::digital::ErrorType for SimStepPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for SimStepPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.set_high()
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        let c = &self.0;
        c.position.set(c.position.get() + if c.forward.get() { 1 } else { -1 });
        Ok(())
    }
}

/// DIR pin latching its carriage's direction.
struct SimDirPin(Carriage);

impl embedded_hal::digital::ErrorType for SimDirPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for SimDirPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.0.forward.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.0.forward.set(true);
        Ok(())
    }
}

/// Limit switch closing at or below zero.
struct SimLimit(Carriage);

impl embedded_hal::digital::ErrorType for SimLimit {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::InputPin for SimLimit {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.0.position.get() <= 0)
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.0.position.get() > 0)
    }
}

fn main() -> Result<()> {
    println!("=== Gantry Example ===\n");

    let left = Carriage::at(2500);
    let right = Carriage::at(-2500);

    let params = DriveParameters::new();
    let mut master = StepperMotorBuilder::new()
        .name("gantry_left")
        .step_pin(SimStepPin(left.clone()))
        .dir_pin(SimDirPin(left.clone()))
        .build(params.claim()?)?;
    let mut slave = StepperMotorBuilder::new()
        .name("gantry_right")
        .slave_inverted(true)
        .step_pin(SimStepPin(right.clone()))
        .dir_pin(SimDirPin(right.clone()))
        .build_slave(&master)?;

    println!("{} ({}) status {}", master.name(), master.role_name(), master.status());
    println!("{} ({})", slave.name(), slave.role_name());

    // Shorten the demo: slow approach at the seek rate
    let homing_config = HomingConfig {
        approach_interval_us: 200,
        clear_distance_steps: 1000,
        ..HomingConfig::default()
    };

    // Simulated time runs much faster than the wall clock
    let sim_time = Cell::new(0u32);
    let clock = || {
        sim_time.set(sim_time.get().wrapping_add(50));
        sim_time.get()
    };

    let started = Instant::now();
    let mut followers: [&mut dyn Follower; 1] = [&mut slave];
    let mut homing = HomingController::new(SimLimit(left.clone()), homing_config);
    match homing.run_to_completion(&mut master, &mut followers, &clock)? {
        HomingProgress::Homed => println!("\nHomed in {:?} (wall clock)", started.elapsed()),
        other => {
            println!("\nHoming failed: {:?}, status {}", other, master.status());
            return Ok(());
        }
    }
    println!(
        "left carriage {} right carriage {}",
        left.position.get(),
        right.position.get()
    );

    println!("\n=== Move ===");
    if !master.set_drive(8000, Direction::Away, 250, 0) {
        println!("Move rejected: {}", master.status());
        return Ok(());
    }
    while !master.params().is_idle() {
        master.drive_axis(clock(), &mut followers)?;
    }
    master.drive_axis(clock(), &mut followers)?;

    let snapshot = master.refresh_snapshot();
    println!(
        "master at {} steps, status {}, ready {}",
        snapshot.absolute_steps.value(),
        snapshot.status,
        snapshot.drive_ready
    );
    let follower = followers[0].snapshot();
    println!("slave snapshot at {} steps", follower.absolute_steps.value());
    println!(
        "left carriage {} right carriage {}",
        left.position.get(),
        right.position.get()
    );

    println!("\n=== Soft limits ===");
    let accepted = master.set_drive(40_000, Direction::Away, 250, 0);
    println!("40000 more steps accepted: {}, status {}", accepted, master.status());
    println!("acknowledged, status {}", master.acknowledge_fault());

    Ok(())
}
