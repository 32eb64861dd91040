//! Homing sequence configuration.

use serde::Deserialize;

/// Parameters of the three-stage limit-switch homing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HomingConfig {
    /// Steps re-armed on every homing poll.
    pub seek_steps: u32,

    /// Step interval while seeking and clearing the switch (µs).
    pub seek_interval_us: u32,

    /// Distance to back off the switch before the slow approach.
    pub clear_distance_steps: i64,

    /// Step interval of the final, slow approach (µs).
    pub approach_interval_us: u32,

    /// Give up after this long; `0` waits forever.
    pub timeout_ms: u32,

    /// Limit input level that means "triggered".
    pub limit_active_high: bool,
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            seek_steps: 200,
            seek_interval_us: 200,
            clear_distance_steps: 5000,
            approach_interval_us: 500,
            timeout_ms: 50_000,
            limit_active_high: true,
        }
    }
}

impl HomingConfig {
    /// Timeout in clock ticks (µs), `None` when disabled.
    pub fn timeout_us(&self) -> Option<u32> {
        match self.timeout_ms {
            0 => None,
            ms => Some(ms.saturating_mul(1000)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_conversion() {
        let mut config = HomingConfig::default();
        assert_eq!(config.timeout_us(), Some(50_000_000));

        config.timeout_ms = 0;
        assert_eq!(config.timeout_us(), None);

        config.timeout_ms = u32::MAX;
        assert_eq!(config.timeout_us(), Some(u32::MAX));
    }
}
