use std::num::NonZeroUsize;
use std::time::Duration;

use sensorwatch_core::error::CoreError;
use sensorwatch_core::evaluation::DEFAULT_BATCH_SIZE;

/// Monitor configuration loaded from environment variables.
///
/// The tick period has no default: deployments must choose one explicitly
/// (a short period for tests, typically one minute in production to match
/// the reading interval).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Time between scheduler ticks.
    pub tick_period: Duration,
    /// Number of readings evaluated together per status decision.
    pub batch_size: NonZeroUsize,
}

impl MonitorConfig {
    /// Build a config, rejecting a zero tick period.
    pub fn new(tick_period: Duration, batch_size: NonZeroUsize) -> Result<Self, CoreError> {
        if tick_period.is_zero() {
            return Err(CoreError::Validation(
                "tick period must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            tick_period,
            batch_size,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                  | Default    |
    /// |--------------------------|------------|
    /// | `MONITOR_TICK_PERIOD_MS` | (required) |
    /// | `MONITOR_BATCH_SIZE`     | `3`        |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let tick_ms: u64 = lookup("MONITOR_TICK_PERIOD_MS")
            .ok_or_else(|| {
                CoreError::Validation("MONITOR_TICK_PERIOD_MS must be set".to_string())
            })?
            .trim()
            .parse()
            .map_err(|_| {
                CoreError::Validation("MONITOR_TICK_PERIOD_MS must be a valid u64".to_string())
            })?;

        let batch_size = match lookup("MONITOR_BATCH_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<NonZeroUsize>()
                .map_err(|_| {
                    CoreError::Validation(
                        "MONITOR_BATCH_SIZE must be a positive integer".to_string(),
                    )
                })?,
            None => DEFAULT_BATCH_SIZE,
        };

        Self::new(Duration::from_millis(tick_ms), batch_size)
    }
}
