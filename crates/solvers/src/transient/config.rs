use thiserror::Error;

/// Configuration for a fixed-step transient solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    dt: f64,
    steps: usize,
}

/// Errors that can occur when validating a transient solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("time step must be finite and positive")]
    TimeStep,
}

impl Config {
    /// Creates a new config with a validated time step.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` is not finite or not strictly positive.
    pub fn new(dt: f64, steps: usize) -> Result<Self, ConfigError> {
        check_time_step(dt)?;
        Ok(Self { dt, steps })
    }

    /// Returns the time step.
    #[must_use]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Returns the number of steps to take.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }
}

pub(crate) fn check_time_step(dt: f64) -> Result<(), ConfigError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::TimeStep)
    }
}
