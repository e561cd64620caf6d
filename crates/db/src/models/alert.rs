//! Alert episode model.

use sensorwatch_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `sensor_alerts` table. Immutable once written.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SensorAlert {
    pub id: DbId,
    pub sensor_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Values of the batch that triggered the episode, in reading order.
    pub reading_values: Vec<i32>,
    pub created_at: Timestamp,
}
