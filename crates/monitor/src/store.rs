//! Storage seam used by the window processor and scheduler.
//!
//! A [`SensorUnit`] scopes exactly one sensor's evaluation run: the readings
//! it reads and the status, cursor, and alert writes it makes. Either
//! [`SensorUnit::commit`] applies all writes together, or the unit is dropped
//! and none of them are applied.

use async_trait::async_trait;
use sensorwatch_core::evaluation::{NewAlertEpisode, ReadingSample};
use sensorwatch_core::status::SensorStatus;
use sensorwatch_core::types::{DbId, Timestamp};
use sensorwatch_db::models::sensor::Sensor;

use crate::error::MonitorError;

/// Entry point into sensor storage.
#[async_trait]
pub trait SensorStore: Send + Sync {
    /// Every registered sensor, in a stable order.
    async fn list_sensors(&self) -> Result<Vec<Sensor>, MonitorError>;

    /// Open an atomic unit of work for one sensor.
    ///
    /// Returns `None` when the sensor is already held by another run (or no
    /// longer exists), so at most one run per sensor is in flight.
    async fn begin(&self, sensor_id: DbId) -> Result<Option<Box<dyn SensorUnit>>, MonitorError>;
}

/// One sensor's evaluation run. Dropping without committing rolls back.
#[async_trait]
pub trait SensorUnit: Send {
    /// The sensor as it was when the unit was opened.
    fn sensor(&self) -> &Sensor;

    /// Readings recorded strictly after `after`, ordered by timestamp ascending.
    async fn readings_after(&mut self, after: Timestamp)
        -> Result<Vec<ReadingSample>, MonitorError>;

    /// Stage the sensor's new status and cursor.
    async fn save_sensor(
        &mut self,
        status: SensorStatus,
        cursor: Option<Timestamp>,
    ) -> Result<(), MonitorError>;

    /// Stage all alert episodes of the run as one batch write.
    async fn save_alerts(&mut self, alerts: &[NewAlertEpisode]) -> Result<u64, MonitorError>;

    /// Apply every staged write atomically.
    async fn commit(self: Box<Self>) -> Result<(), MonitorError>;
}
