//! Windowed status evaluation for sensor readings.
//!
//! Pure logic -- no database access. The caller fetches the readings that
//! arrived after the sensor's cursor, hands them to [`evaluate_window`], and
//! persists the returned [`WindowOutcome`] as one unit.
//!
//! Readings are consumed in consecutive batches of `batch_size`. Each batch
//! moves the sensor through the status machine ([`next_status`]) and may open
//! an alert episode ([`alert_for_transition`]). Only full batches move the
//! cursor; a trailing short batch still updates the status and is re-read on
//! the next run.

use std::num::NonZeroUsize;

use serde::Serialize;

use crate::status::SensorStatus;
use crate::types::Timestamp;

/// Batch size used when nothing else is configured.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(n) => n,
    None => unreachable!(),
};

/// A single reading as seen by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingSample {
    pub value: i32,
    pub recorded_at: Timestamp,
}

/// An alert episode produced by an OK/WARN -> ALERT transition, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAlertEpisode {
    /// Timestamp of the first reading in the triggering batch.
    pub start_time: Timestamp,
    /// Timestamp of the last reading in the triggering batch.
    pub end_time: Timestamp,
    /// The triggering batch's values, in reading order.
    pub values: Vec<i32>,
}

/// The slice of sensor state the evaluator needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub threshold: i32,
    pub status: SensorStatus,
    /// Timestamp of the last fully consumed batch, if any.
    pub cursor: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl WindowState {
    /// Readings strictly after this instant are still unprocessed.
    ///
    /// Falls back to the sensor creation time when no batch has ever been
    /// fully consumed.
    pub fn read_from(&self) -> Timestamp {
        self.cursor.unwrap_or(self.created_at)
    }
}

/// Result of evaluating one run's worth of readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOutcome {
    pub status: SensorStatus,
    pub cursor: Option<Timestamp>,
    pub alerts: Vec<NewAlertEpisode>,
    pub full_batches: usize,
    /// Zero or one: only the trailing batch can be short.
    pub partial_batches: usize,
}

/// Count the readings at or above `threshold`.
pub fn count_high(batch: &[ReadingSample], threshold: i32) -> usize {
    batch.iter().filter(|r| r.value >= threshold).count()
}

/// Compute the status after one batch.
///
/// A batch made entirely of high readings escalates to ALERT, a batch with no
/// high readings resets to OK (even from ALERT), and a mixed batch raises OK
/// to WARN while leaving WARN and ALERT where they are.
pub fn next_status(
    batch: &[ReadingSample],
    threshold: i32,
    current: SensorStatus,
    batch_size: NonZeroUsize,
) -> SensorStatus {
    let high = count_high(batch, threshold);

    if high == batch_size.get() && current != SensorStatus::Alert {
        SensorStatus::Alert
    } else if high == 0 {
        SensorStatus::Ok
    } else if current == SensorStatus::Ok {
        SensorStatus::Warn
    } else {
        current
    }
}

/// Open an alert episode if the batch moved the sensor into ALERT.
///
/// Returns `None` for every other transition, including staying in ALERT.
pub fn alert_for_transition(
    before: SensorStatus,
    after: SensorStatus,
    batch: &[ReadingSample],
) -> Option<NewAlertEpisode> {
    if before == SensorStatus::Alert || after != SensorStatus::Alert {
        return None;
    }

    let first = batch.first()?;
    let last = batch.last()?;

    Some(NewAlertEpisode {
        start_time: first.recorded_at,
        end_time: last.recorded_at,
        values: batch.iter().map(|r| r.value).collect(),
    })
}

/// Run the status machine over `readings`, which must be ordered by
/// `recorded_at` ascending and all lie after [`WindowState::read_from`].
///
/// Status is threaded through the batches in order, so batch `n + 1` sees
/// the status produced by batch `n`. The cursor never moves backwards.
pub fn evaluate_window(
    state: &WindowState,
    readings: &[ReadingSample],
    batch_size: NonZeroUsize,
) -> WindowOutcome {
    let mut status = state.status;
    let mut cursor = state.cursor;
    let mut alerts = Vec::new();
    let mut full_batches = 0;
    let mut partial_batches = 0;

    for batch in readings.chunks(batch_size.get()) {
        let next = next_status(batch, state.threshold, status, batch_size);

        if let Some(alert) = alert_for_transition(status, next, batch) {
            alerts.push(alert);
        }
        status = next;

        if batch.len() == batch_size.get() {
            full_batches += 1;
            if let Some(last) = batch.last() {
                cursor = cursor.max(Some(last.recorded_at));
            }
        } else {
            partial_batches += 1;
        }
    }

    WindowOutcome {
        status,
        cursor,
        alerts,
        full_batches,
        partial_batches,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
