//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{MotorConfig, SystemConfig};

/// Validate a system configuration.
///
/// Checks:
/// - Travel range leaves room inside the soft-limit margin
/// - Sensor dead band, wrap threshold and scale are usable
/// - Homing intervals and distances are non-zero
/// - Slave bindings reference an existing, non-slave motor other than themselves
pub fn validate_config(config: &SystemConfig) -> Result<()> {
    for (name, motor) in config.motors.iter() {
        validate_motor(motor)?;
        validate_binding(name.as_str(), motor, config)?;
    }

    Ok(())
}

fn validate_motor(config: &MotorConfig) -> Result<()> {
    if !config.limits().is_valid() {
        return Err(Error::Config(ConfigError::InvalidTravel {
            max_angle: config.max_angle,
            margin: config.limit_margin,
        }));
    }

    let sensor = &config.sensor;
    if sensor.dead_band_low >= sensor.dead_band_high
        || sensor.dead_band_high > sensor.counts_per_revolution
    {
        return Err(Error::Config(ConfigError::InvalidDeadBand {
            low: sensor.dead_band_low,
            high: sensor.dead_band_high,
        }));
    }

    if sensor.wrap_threshold == 0 || sensor.wrap_threshold >= sensor.counts_per_revolution {
        return Err(Error::Config(ConfigError::InvalidWrapThreshold(
            sensor.wrap_threshold,
        )));
    }

    // Also rejects NaN
    if !(sensor.steps_per_count > 0.0) {
        return Err(Error::Config(ConfigError::InvalidSensorScale(
            sensor.steps_per_count,
        )));
    }

    let homing = &config.homing;
    if homing.seek_steps == 0 {
        return Err(Error::Config(ConfigError::InvalidHoming("seek_steps")));
    }
    if homing.seek_interval_us == 0 {
        return Err(Error::Config(ConfigError::InvalidHoming("seek_interval_us")));
    }
    if homing.approach_interval_us == 0 {
        return Err(Error::Config(ConfigError::InvalidHoming(
            "approach_interval_us",
        )));
    }
    if homing.clear_distance_steps <= 0 {
        return Err(Error::Config(ConfigError::InvalidHoming(
            "clear_distance_steps",
        )));
    }

    Ok(())
}

fn validate_binding(name: &str, motor: &MotorConfig, config: &SystemConfig) -> Result<()> {
    let Some(master) = motor.slave_of.as_ref() else {
        return Ok(());
    };

    let valid = master.as_str() != name
        && config
            .motor(master.as_str())
            .map(|m| !m.is_slave())
            .unwrap_or(false);

    if !valid {
        return Err(Error::Config(ConfigError::InvalidSlaveBinding {
            motor: heapless::String::try_from(name).unwrap_or_default(),
            master: master.clone(),
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_motor_is_valid() {
        assert!(validate_motor(&MotorConfig::new("test")).is_ok());
    }

    #[test]
    fn test_invalid_travel() {
        let mut config = MotorConfig::new("test");
        config.max_angle = 80;

        let result = validate_motor(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidTravel { max_angle: 80, margin: 50 }))
        ));
    }

    #[test]
    fn test_invalid_dead_band() {
        let mut config = MotorConfig::new("test");
        config.sensor.dead_band_low = 600;
        config.sensor.dead_band_high = 400;
        assert!(matches!(
            validate_motor(&config),
            Err(Error::Config(ConfigError::InvalidDeadBand { .. }))
        ));

        let mut config = MotorConfig::new("test");
        config.sensor.dead_band_high = 2000;
        assert!(matches!(
            validate_motor(&config),
            Err(Error::Config(ConfigError::InvalidDeadBand { .. }))
        ));
    }

    #[test]
    fn test_invalid_sensor_scale() {
        let mut config = MotorConfig::new("test");
        config.sensor.steps_per_count = 0.0;
        assert!(matches!(
            validate_motor(&config),
            Err(Error::Config(ConfigError::InvalidSensorScale(_)))
        ));

        config.sensor.steps_per_count = f32::NAN;
        assert!(validate_motor(&config).is_err());
    }

    #[test]
    fn test_invalid_homing() {
        let mut config = MotorConfig::new("test");
        config.homing.approach_interval_us = 0;
        assert!(matches!(
            validate_motor(&config),
            Err(Error::Config(ConfigError::InvalidHoming("approach_interval_us")))
        ));
    }

    #[test]
    fn test_slave_bindings() {
        let mut config = SystemConfig::default();

        let master = MotorConfig::new("master");
        let mut slave = MotorConfig::new("slave");
        slave.slave_of = Some(heapless::String::try_from("x").unwrap());
        let _ = config.motors.insert(heapless::String::try_from("x").unwrap(), master);
        let _ = config.motors.insert(heapless::String::try_from("y").unwrap(), slave.clone());
        assert!(validate_config(&config).is_ok());

        // Chained slave
        let mut chained = MotorConfig::new("chained");
        chained.slave_of = Some(heapless::String::try_from("y").unwrap());
        let _ = config.motors.insert(heapless::String::try_from("z").unwrap(), chained);
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidSlaveBinding { .. }))
        ));
    }

    #[test]
    fn test_self_binding_rejected() {
        let mut config = SystemConfig::default();
        let mut motor = MotorConfig::new("loop");
        motor.slave_of = Some(heapless::String::try_from("x").unwrap());
        let _ = config.motors.insert(heapless::String::try_from("x").unwrap(), motor);

        assert!(validate_config(&config).is_err());
    }
}
