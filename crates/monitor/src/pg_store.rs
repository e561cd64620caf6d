//! Postgres implementation of the sensor store.
//!
//! Each unit of work is one sqlx transaction. Opening it locks the sensor row
//! with `FOR UPDATE SKIP LOCKED`, so a second evaluator running at the same
//! time (another process, or an overlapping tick) skips the sensor instead
//! of interleaving with the run in flight.

use async_trait::async_trait;
use sensorwatch_core::evaluation::{NewAlertEpisode, ReadingSample};
use sensorwatch_core::status::SensorStatus;
use sensorwatch_core::types::{DbId, Timestamp};
use sensorwatch_db::models::sensor::Sensor;
use sensorwatch_db::repositories::{AlertRepo, ReadingRepo, SensorRepo};
use sensorwatch_db::DbPool;
use sqlx::{Postgres, Transaction};

use crate::error::MonitorError;
use crate::store::{SensorStore, SensorUnit};

/// Sensor store backed by the shared connection pool.
#[derive(Clone)]
pub struct PgSensorStore {
    pool: DbPool,
}

impl PgSensorStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SensorStore for PgSensorStore {
    async fn list_sensors(&self) -> Result<Vec<Sensor>, MonitorError> {
        Ok(SensorRepo::list(&self.pool).await?)
    }

    async fn begin(&self, sensor_id: DbId) -> Result<Option<Box<dyn SensorUnit>>, MonitorError> {
        let mut tx = self.pool.begin().await?;

        match SensorRepo::lock_for_evaluation(&mut tx, sensor_id).await? {
            Some(sensor) => Ok(Some(Box::new(PgSensorUnit { tx, sensor }))),
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }
}

/// A locked sensor row plus the transaction holding the lock.
struct PgSensorUnit {
    tx: Transaction<'static, Postgres>,
    sensor: Sensor,
}

#[async_trait]
impl SensorUnit for PgSensorUnit {
    fn sensor(&self) -> &Sensor {
        &self.sensor
    }

    async fn readings_after(
        &mut self,
        after: Timestamp,
    ) -> Result<Vec<ReadingSample>, MonitorError> {
        let readings = ReadingRepo::list_after(&mut self.tx, self.sensor.id, after).await?;
        Ok(readings.iter().map(ReadingSample::from).collect())
    }

    async fn save_sensor(
        &mut self,
        status: SensorStatus,
        cursor: Option<Timestamp>,
    ) -> Result<(), MonitorError> {
        SensorRepo::save_evaluation(&mut self.tx, self.sensor.id, status, cursor).await?;
        Ok(())
    }

    async fn save_alerts(&mut self, alerts: &[NewAlertEpisode]) -> Result<u64, MonitorError> {
        Ok(AlertRepo::insert_batch(&mut self.tx, self.sensor.id, alerts).await?)
    }

    async fn commit(self: Box<Self>) -> Result<(), MonitorError> {
        self.tx.commit().await?;
        Ok(())
    }
}
