use sensorwatch_core::error::CoreError;
use sensorwatch_core::types::DbId;

/// Errors raised while evaluating sensors.
///
/// None of these are fatal to the process: the scheduler logs them and moves
/// on to the next sensor.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A domain-level error from `sensorwatch_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The evaluation task for a sensor panicked.
    #[error("Evaluation of sensor {sensor_id} panicked")]
    Panicked { sensor_id: DbId },
}
