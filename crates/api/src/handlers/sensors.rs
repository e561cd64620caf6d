//! Handlers for sensor registration, reading intake, and the derived views
//! (status, metrics, alert episodes).
//!
//! Readings are only stored here; evaluation happens on the monitor's next
//! tick, so `submit_reading` answers 202.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use sensorwatch_core::error::CoreError;
use sensorwatch_core::status::SensorStatus;
use sensorwatch_core::types::{DbId, Timestamp};
use sensorwatch_db::models::reading::CreateReading;
use sensorwatch_db::models::sensor::{CreateSensor, Sensor};
use sensorwatch_db::repositories::{AlertRepo, ReadingRepo, SensorRepo};
use sensorwatch_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Body for `POST /sensors`. The threshold falls back to the configured default.
#[derive(Debug, Deserialize)]
pub struct CreateSensorRequest {
    pub threshold: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct SensorCreated {
    pub sensor_id: DbId,
}

/// Body for `POST /sensors/{id}/readings`.
#[derive(Debug, Deserialize)]
pub struct SubmitReadingRequest {
    pub value: i32,
    pub timestamp: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct ReadingAccepted {
    pub reading_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct SensorStatusView {
    pub status: SensorStatus,
}

#[derive(Debug, Serialize)]
pub struct SensorMetricsView {
    pub max_value: Option<i32>,
    pub avg_value: Option<i32>,
    pub lookback_days: u32,
}

#[derive(Debug, Serialize)]
pub struct AlertView {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub values: Vec<i32>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_sensor(pool: &DbPool, id: DbId) -> AppResult<Sensor> {
    let sensor = SensorRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Sensor",
            id,
        })?;
    Ok(sensor)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/sensors
///
/// Register a sensor. New sensors start in `OK` with no evaluated window.
pub async fn create_sensor(
    State(state): State<AppState>,
    Json(input): Json<CreateSensorRequest>,
) -> AppResult<impl IntoResponse> {
    let threshold = input.threshold.unwrap_or(state.config.default_threshold);
    let sensor = SensorRepo::create(&state.pool, &CreateSensor { threshold }).await?;

    tracing::info!(sensor_id = sensor.id, threshold, "Sensor registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SensorCreated {
                sensor_id: sensor.id,
            },
        }),
    ))
}

/// POST /api/v1/sensors/{id}/readings
///
/// Store one reading. It is picked up by the next evaluation tick.
pub async fn submit_reading(
    State(state): State<AppState>,
    Path(sensor_id): Path<DbId>,
    Json(input): Json<SubmitReadingRequest>,
) -> AppResult<impl IntoResponse> {
    find_sensor(&state.pool, sensor_id).await?;

    let reading = ReadingRepo::insert(
        &state.pool,
        sensor_id,
        &CreateReading {
            value: input.value,
            recorded_at: input.timestamp,
        },
    )
    .await?;

    tracing::debug!(
        sensor_id,
        reading_id = reading.id,
        value = reading.value,
        "Reading accepted"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: ReadingAccepted {
                reading_id: reading.id,
            },
        }),
    ))
}

/// GET /api/v1/sensors/{id}
///
/// Current status as of the last committed evaluation.
pub async fn get_status(
    State(state): State<AppState>,
    Path(sensor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let sensor = find_sensor(&state.pool, sensor_id).await?;

    Ok(Json(DataResponse {
        data: SensorStatusView {
            status: sensor.status()?,
        },
    }))
}

/// GET /api/v1/sensors/{id}/metrics
///
/// Max and average reading over the configured lookback window. Both are
/// `null` when the sensor has no readings in that window.
pub async fn get_metrics(
    State(state): State<AppState>,
    Path(sensor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_sensor(&state.pool, sensor_id).await?;

    let lookback_days = state.config.metrics_lookback_days.get();
    let since = Utc::now() - Duration::days(i64::from(lookback_days));
    let stats = ReadingRepo::stats_since(&state.pool, sensor_id, since).await?;

    Ok(Json(DataResponse {
        data: SensorMetricsView {
            max_value: stats.max_value,
            avg_value: stats.avg_value,
            lookback_days,
        },
    }))
}

/// GET /api/v1/sensors/{id}/alerts
///
/// Every alert episode for the sensor, oldest first.
pub async fn list_alerts(
    State(state): State<AppState>,
    Path(sensor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_sensor(&state.pool, sensor_id).await?;

    let alerts: Vec<AlertView> = AlertRepo::list_for_sensor(&state.pool, sensor_id)
        .await?
        .into_iter()
        .map(|alert| AlertView {
            start_time: alert.start_time,
            end_time: alert.end_time,
            values: alert.reading_values,
        })
        .collect();

    Ok(Json(DataResponse { data: alerts }))
}
