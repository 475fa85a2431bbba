use std::time::Duration;

use thiserror::Error;

use crate::node::Value;
use crate::tree::DEFAULT_VALUE_RANGE;
use crate::workers::Role;

/// Arrival process for one worker role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrivals {
    /// Mean of the Poisson count drawn before each operation.
    pub mean: f64,
    /// Sleep per unit of that count. Zero disables sleeping.
    pub tick: Duration,
}

impl Arrivals {
    pub const fn new(mean: f64, tick: Duration) -> Self {
        Arrivals { mean, tick }
    }

    /// Same means, no sleeping. Useful for tests and benchmarks.
    pub const fn untimed(self) -> Self {
        Arrivals {
            mean: self.mean,
            tick: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadConfig {
    /// Random inserts the Inserter performs before signalling completion.
    pub insert_quota: usize,
    /// Random values are drawn from `0..value_range`.
    pub value_range: Value,
    pub inserter: Arrivals,
    pub deleter: Arrivals,
    pub balancer: Arrivals,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            insert_quota: 1000,
            value_range: DEFAULT_VALUE_RANGE,
            inserter: Arrivals::new(2.0, Duration::from_micros(50)),
            deleter: Arrivals::new(2.0, Duration::from_micros(50)),
            balancer: Arrivals::new(20.0, Duration::from_micros(100)),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("value range must be positive, got {0}")]
    EmptyValueRange(Value),
    #[error("{role} arrival mean must be finite and non-negative, got {mean}")]
    InvalidMean { role: Role, mean: f64 },
}

impl WorkloadConfig {
    pub fn arrivals(&self, role: Role) -> Arrivals {
        match role {
            Role::Inserter => self.inserter,
            Role::Deleter => self.deleter,
            Role::Balancer => self.balancer,
        }
    }

    pub fn untimed(self) -> Self {
        WorkloadConfig {
            inserter: self.inserter.untimed(),
            deleter: self.deleter.untimed(),
            balancer: self.balancer.untimed(),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.value_range <= 0 {
            return Err(ConfigError::EmptyValueRange(self.value_range));
        }
        for role in Role::ALL {
            let mean = self.arrivals(role).mean;
            if !mean.is_finite() || mean < 0.0 {
                return Err(ConfigError::InvalidMean { role, mean });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorkloadConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.insert_quota, 1000);
        assert_eq!(config.balancer.mean, 20.0);
        assert_eq!(config.balancer.tick, Duration::from_micros(100));
        assert!(config.untimed().inserter.tick.is_zero());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = WorkloadConfig {
            value_range: 0,
            ..WorkloadConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyValueRange(0)));

        let mut config = WorkloadConfig::default();
        config.deleter.mean = -1.0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "deleter arrival mean must be finite and non-negative, got -1"
        );

        let mut config = WorkloadConfig::default();
        config.balancer.mean = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMean {
                role: Role::Balancer,
                ..
            })
        ));
    }
}
