//! Reading entity model and DTOs (append-only time-series).

use sensorwatch_core::evaluation::ReadingSample;
use sensorwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `readings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reading {
    pub id: DbId,
    pub sensor_id: DbId,
    pub value: i32,
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

impl From<&Reading> for ReadingSample {
    fn from(reading: &Reading) -> Self {
        ReadingSample {
            value: reading.value,
            recorded_at: reading.recorded_at,
        }
    }
}

/// DTO for inserting a new reading.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReading {
    pub value: i32,
    pub recorded_at: Timestamp,
}

/// Aggregate over a sensor's recent readings.
///
/// Both fields are `None` when no readings fall inside the window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReadingStats {
    pub max_value: Option<i32>,
    /// Average truncated toward zero.
    pub avg_value: Option<i32>,
}
