pub mod health;
pub mod sensors;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sensors                              register (POST)
/// /sensors/{id}                         current status
/// /sensors/{id}/readings                submit reading (POST)
/// /sensors/{id}/metrics                 max/avg over the lookback window
/// /sensors/{id}/alerts                  alert episodes
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/sensors", sensors::router())
}
