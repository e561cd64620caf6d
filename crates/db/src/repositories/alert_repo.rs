//! Repository for the `sensor_alerts` table.

use sensorwatch_core::evaluation::NewAlertEpisode;
use sensorwatch_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::alert::SensorAlert;

/// Column list for `sensor_alerts` SELECT queries.
const COLUMNS: &str = "id, sensor_id, start_time, end_time, reading_values, created_at";

/// Number of bound parameters per inserted alert row.
const PARAMS_PER_ROW: usize = 4;

/// Postgres caps a statement at 65535 bind parameters.
pub const MAX_ROWS_PER_INSERT: usize = u16::MAX as usize / PARAMS_PER_ROW;

/// Provides query operations for alert episodes.
pub struct AlertRepo;

impl AlertRepo {
    /// Batch-insert the alert episodes produced by one evaluation run.
    ///
    /// Rows go out in multi-row INSERTs of at most [`MAX_ROWS_PER_INSERT`]
    /// rows, all on `conn`, so a caller inside a transaction gets every
    /// chunk or none. Returns the number of rows written.
    pub async fn insert_batch(
        conn: &mut PgConnection,
        sensor_id: DbId,
        alerts: &[NewAlertEpisode],
    ) -> Result<u64, sqlx::Error> {
        let mut written = 0;
        for chunk in alerts.chunks(MAX_ROWS_PER_INSERT) {
            written += Self::insert_chunk(&mut *conn, sensor_id, chunk).await?;
        }
        Ok(written)
    }

    async fn insert_chunk(
        conn: &mut PgConnection,
        sensor_id: DbId,
        alerts: &[NewAlertEpisode],
    ) -> Result<u64, sqlx::Error> {
        let mut query = String::from(
            "INSERT INTO sensor_alerts (sensor_id, start_time, end_time, reading_values) VALUES ",
        );
        for i in 0..alerts.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let base = i * PARAMS_PER_ROW;
            query.push_str(&format!(
                "(${}, ${}, ${}, ${})",
                base + 1,
                base + 2,
                base + 3,
                base + 4
            ));
        }

        let mut q = sqlx::query(&query);
        for alert in alerts {
            q = q
                .bind(sensor_id)
                .bind(alert.start_time)
                .bind(alert.end_time)
                .bind(alert.values.as_slice());
        }

        let result = q.execute(conn).await?;
        Ok(result.rows_affected())
    }

    /// All alert episodes for a sensor, oldest first.
    pub async fn list_for_sensor(
        pool: &PgPool,
        sensor_id: DbId,
    ) -> Result<Vec<SensorAlert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sensor_alerts \
             WHERE sensor_id = $1 \
             ORDER BY start_time ASC, id ASC"
        );
        sqlx::query_as::<_, SensorAlert>(&query)
            .bind(sensor_id)
            .fetch_all(pool)
            .await
    }
}
