//! Route definitions for sensors, their readings, and derived views.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sensors;
use crate::state::AppState;

/// Sensor routes mounted at `/sensors`.
///
/// ```text
/// POST   /                  -> create_sensor
/// GET    /{id}              -> get_status
/// POST   /{id}/readings     -> submit_reading
/// GET    /{id}/metrics      -> get_metrics
/// GET    /{id}/alerts       -> list_alerts
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sensors::create_sensor))
        .route("/{id}", get(sensors::get_status))
        .route("/{id}/readings", post(sensors::submit_reading))
        .route("/{id}/metrics", get(sensors::get_metrics))
        .route("/{id}/alerts", get(sensors::list_alerts))
}
