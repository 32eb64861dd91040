//! Example: building drives from TOML configuration.
//!
//! This example demonstrates how to:
//! - Parse and validate a multi-axis configuration
//! - Build each master with its slaves by name
//! - Check drift between step count and encoder
//!
//! Run with: `cargo run --example config_driven --features std`

use std::cell::Cell;

use stepper_drive::{
    config::parse_config,
    error::{ConfigError, Error, Result},
    Direction, DriveParameters, PositionSensor, StepperMotorBuilder,
};

/// Mock STEP/DIR pin for demonstration.
struct MockPin;

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// Mock potentiometer whose reading the example sets directly.
struct MockEncoder<'a>(&'a Cell<u16>);

impl PositionSensor for MockEncoder<'_> {
    type Error = core::convert::Infallible;

    fn read(&mut self) -> core::result::Result<u16, Self::Error> {
        Ok(self.0.get())
    }
}

const CONFIG: &str = r#"
[motors.tilt]
name = "tilt"
max_angle_steps = 20000
limit_margin_steps = 100

[motors.tilt.deviation]
enabled = true
tolerance_steps = 200

[motors.tilt.homing]
approach_interval_us = 800
timeout_ms = 30000

[motors.lift_a]
name = "lift_a"
invert_direction = true

[motors.lift_b]
name = "lift_b"
slave_of = "lift_a"
slave_inverted = true
"#;

fn main() -> Result<()> {
    println!("=== Configuration-Driven Example ===\n");

    let config = parse_config(CONFIG)?;

    for name in config.motor_names() {
        let motor = config.motor(name).ok_or_else(|| {
            Error::Config(ConfigError::MotorNotFound(
                heapless::String::try_from(name).unwrap_or_default(),
            ))
        })?;
        match motor.slave_of.as_ref() {
            Some(master) => println!(
                "{name}: follows {master} (inverted: {})",
                motor.slave_inverted
            ),
            None => {
                let slaves: Vec<_> = config.slaves_of(name).collect();
                println!(
                    "{name}: master, travel 0..{} margin {}, slaves {:?}",
                    motor.max_angle, motor.limit_margin, slaves
                );
            }
        }
    }

    // A broken binding is caught at parse time
    let broken = CONFIG.replace("slave_of = \"lift_a\"", "slave_of = \"lift_c\"");
    match parse_config(&broken) {
        Err(e) => println!("\nRejected configuration: {e}"),
        Ok(_) => println!("\nUnexpectedly accepted broken configuration"),
    }

    println!("\n=== Tilt axis drift check ===");
    let reading = Cell::new(0u16);
    let tilt_params = DriveParameters::new();
    let mut tilt = StepperMotorBuilder::new()
        .from_config(&config, "tilt")?
        .step_pin(MockPin)
        .dir_pin(MockPin)
        .sensor(MockEncoder(&reading))
        .build(tilt_params.claim()?)?;

    // Not homed: run under override
    tilt.override_on();
    tilt.set_drive(960, Direction::Away, 100, 0);
    let mut now = 0u32;
    while !tilt_params.is_idle() {
        now += 100;
        tilt.drive_tick(now)?;
        // Nominal 3.125 steps per count, but the coupling slips
        if now % 1000 == 0 {
            let target = (tilt.absolute_steps().value() as f32 / 4.0) as u16;
            reading.set(target.min(1023));
            tilt.enc_update()?;
        }
    }
    tilt.override_off();

    println!(
        "steps {} sensor {} (deviation {})",
        tilt.absolute_steps().value(),
        tilt.sensor_absolute().value(),
        tilt.deviation_monitor().deviation(tilt.tracker()).value()
    );
    let drifted = tilt.check_deviation();
    println!("drift detected: {drifted}, status {}", tilt.status());

    println!("\n=== Lift pair ===");
    let lift_params = DriveParameters::new();
    let lift_a = StepperMotorBuilder::new()
        .from_config(&config, "lift_a")?
        .step_pin(MockPin)
        .dir_pin(MockPin)
        .build(lift_params.claim()?)?;
    let lift_b = StepperMotorBuilder::new()
        .from_config(&config, "lift_b")?
        .step_pin(MockPin)
        .dir_pin(MockPin)
        .build_slave(&lift_a)?;
    println!(
        "{} ({}) drives {} ({}, inverted {})",
        lift_a.name(),
        lift_a.role_name(),
        lift_b.name(),
        lift_b.role_name(),
        lift_b.is_inverted()
    );

    Ok(())
}
