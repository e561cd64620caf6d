//! Window processor: evaluates one sensor's unprocessed readings.
//!
//! Reads everything after the sensor's cursor, runs it through
//! [`evaluate_window`], then writes the new status, cursor, and alert
//! episodes and commits them as one unit.

use std::num::NonZeroUsize;

use sensorwatch_core::evaluation::evaluate_window;
use sensorwatch_core::status::SensorStatus;
use sensorwatch_core::types::{DbId, Timestamp};

use crate::error::MonitorError;
use crate::store::SensorUnit;

/// What a single run did for a sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No readings after the cursor. Nothing was written.
    NoReadings,
    /// Readings were evaluated and the results committed.
    Evaluated(RunReport),
}

/// Details of a committed evaluation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub sensor_id: DbId,
    pub previous_status: SensorStatus,
    pub status: SensorStatus,
    pub cursor: Option<Timestamp>,
    pub readings: usize,
    pub full_batches: usize,
    pub alerts_created: u64,
}

/// Evaluate and persist one sensor's pending readings.
///
/// Consumes the unit: it is either committed here or dropped (rolled back)
/// on the empty path and on any error.
pub async fn process_sensor(
    mut unit: Box<dyn SensorUnit>,
    batch_size: NonZeroUsize,
) -> Result<RunOutcome, MonitorError> {
    let sensor_id = unit.sensor().id;
    let state = unit.sensor().window_state()?;

    tracing::debug!(sensor_id, read_from = %state.read_from(), "Fetching pending readings");
    let readings = unit.readings_after(state.read_from()).await?;

    if readings.is_empty() {
        tracing::warn!(sensor_id, "No new readings for sensor");
        return Ok(RunOutcome::NoReadings);
    }

    let outcome = evaluate_window(&state, &readings, batch_size);

    unit.save_sensor(outcome.status, outcome.cursor).await?;
    let alerts_created = unit.save_alerts(&outcome.alerts).await?;
    unit.commit().await?;

    if outcome.status != state.status {
        tracing::info!(
            sensor_id,
            from = %state.status,
            to = %outcome.status,
            "Sensor status changed"
        );
    }
    tracing::info!(
        sensor_id,
        readings = readings.len(),
        full_batches = outcome.full_batches,
        alerts_created,
        "Sensor readings evaluated"
    );

    Ok(RunOutcome::Evaluated(RunReport {
        sensor_id,
        previous_status: state.status,
        status: outcome.status,
        cursor: outcome.cursor,
        readings: readings.len(),
        full_batches: outcome.full_batches,
        alerts_created,
    }))
}
