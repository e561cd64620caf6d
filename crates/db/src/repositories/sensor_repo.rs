//! Repository for the `sensors` table.

use sensorwatch_core::status::SensorStatus;
use sensorwatch_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::sensor::{CreateSensor, Sensor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, threshold, status_id, last_window_at, created_at";

/// Provides CRUD and evaluation-state operations for sensors.
pub struct SensorRepo;

impl SensorRepo {
    /// Register a new sensor. Status starts at OK and the cursor is unset.
    pub async fn create(pool: &PgPool, input: &CreateSensor) -> Result<Sensor, sqlx::Error> {
        let query = format!(
            "INSERT INTO sensors (threshold, status_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sensor>(&query)
            .bind(input.threshold)
            .bind(SensorStatus::Ok.id())
            .fetch_one(pool)
            .await
    }

    /// Find a sensor by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Sensor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensors WHERE id = $1");
        sqlx::query_as::<_, Sensor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every registered sensor, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Sensor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensors ORDER BY id ASC");
        sqlx::query_as::<_, Sensor>(&query).fetch_all(pool).await
    }

    /// Lock a sensor row for the rest of the current transaction.
    ///
    /// Uses `FOR UPDATE SKIP LOCKED` so that a second evaluator (another
    /// process, or an overlapping tick) gets `None` instead of blocking
    /// behind a run that is still in flight.
    pub async fn lock_for_evaluation(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Sensor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sensors WHERE id = $1 FOR UPDATE SKIP LOCKED");
        sqlx::query_as::<_, Sensor>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Store the status and cursor produced by an evaluation run.
    ///
    /// The cursor only moves forward: an older value never overwrites a
    /// newer one already stored.
    pub async fn save_evaluation(
        conn: &mut PgConnection,
        id: DbId,
        status: SensorStatus,
        cursor: Option<Timestamp>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE sensors \
             SET status_id = $2, \
                 last_window_at = GREATEST(last_window_at, $3) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(status.id())
        .bind(cursor)
        .execute(conn)
        .await?;
        Ok(())
    }
}
