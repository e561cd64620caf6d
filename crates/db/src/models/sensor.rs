//! Sensor entity model and DTOs.

use sensorwatch_core::error::CoreError;
use sensorwatch_core::evaluation::WindowState;
use sensorwatch_core::status::{SensorStatus, StatusId};
use sensorwatch_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sensors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sensor {
    pub id: DbId,
    pub threshold: i32,
    pub status_id: StatusId,
    /// Cursor: timestamp of the last fully evaluated batch.
    pub last_window_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Sensor {
    /// Decode the stored status id.
    ///
    /// An unknown id means the row itself is corrupt, so it surfaces as
    /// [`CoreError::Internal`] rather than a validation failure.
    pub fn status(&self) -> Result<SensorStatus, CoreError> {
        SensorStatus::from_id(self.status_id)
            .map_err(|e| CoreError::Internal(format!("sensor {}: {e}", self.id)))
    }

    /// The state the window evaluator starts from.
    pub fn window_state(&self) -> Result<WindowState, CoreError> {
        Ok(WindowState {
            threshold: self.threshold,
            status: self.status()?,
            cursor: self.last_window_at,
            created_at: self.created_at,
        })
    }
}

/// DTO for registering a new sensor. Status always starts at OK.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSensor {
    pub threshold: i32,
}
