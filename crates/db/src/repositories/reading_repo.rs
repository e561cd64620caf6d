//! Repository for the `readings` table (append-only time-series).

use sensorwatch_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::reading::{CreateReading, Reading, ReadingStats};

/// Column list for `readings` SELECT queries.
const COLUMNS: &str = "id, sensor_id, value, recorded_at, created_at";

/// Provides query operations for sensor readings.
pub struct ReadingRepo;

impl ReadingRepo {
    /// Insert a single reading for a sensor.
    pub async fn insert(
        pool: &PgPool,
        sensor_id: DbId,
        input: &CreateReading,
    ) -> Result<Reading, sqlx::Error> {
        let query = format!(
            "INSERT INTO readings (sensor_id, value, recorded_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(sensor_id)
            .bind(input.value)
            .bind(input.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// Readings recorded strictly after `after`, oldest first.
    ///
    /// Ties on `recorded_at` are broken by insertion order.
    pub async fn list_after(
        conn: &mut PgConnection,
        sensor_id: DbId,
        after: Timestamp,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM readings \
             WHERE sensor_id = $1 AND recorded_at > $2 \
             ORDER BY recorded_at ASC, id ASC"
        );
        sqlx::query_as::<_, Reading>(&query)
            .bind(sensor_id)
            .bind(after)
            .fetch_all(conn)
            .await
    }

    /// Max and average value of readings recorded after `since`.
    pub async fn stats_since(
        pool: &PgPool,
        sensor_id: DbId,
        since: Timestamp,
    ) -> Result<ReadingStats, sqlx::Error> {
        sqlx::query_as::<_, ReadingStats>(
            "SELECT MAX(value) AS max_value, \
                    TRUNC(AVG(value))::INTEGER AS avg_value \
             FROM readings \
             WHERE sensor_id = $1 AND recorded_at > $2",
        )
        .bind(sensor_id)
        .bind(since)
        .fetch_one(pool)
        .await
    }
}
