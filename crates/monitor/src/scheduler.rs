//! Periodic sensor evaluation loop.
//!
//! [`Scheduler`] wakes every `tick_period`, lists all sensors, and runs the
//! window processor for each one inside its own unit of work. Sensors are
//! processed one after another; the next tick cannot start until the current
//! one has finished, and ticks missed while a slow tick runs are skipped
//! rather than queued.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use sensorwatch_core::types::DbId;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::processor::{process_sensor, RunOutcome};
use crate::store::SensorStore;

/// Per-tick counts, mainly for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Sensors whose readings were evaluated and committed.
    pub evaluated: usize,
    /// Sensors with no new readings.
    pub idle: usize,
    /// Sensors skipped because another run held them.
    pub busy: usize,
    /// Sensors whose run failed; their writes were rolled back.
    pub failed: usize,
}

impl TickSummary {
    pub fn total(&self) -> usize {
        self.evaluated + self.idle + self.busy + self.failed
    }
}

/// Result of attempting one sensor inside a tick.
enum SensorRun {
    Done(RunOutcome),
    Busy,
}

/// Background service that evaluates every sensor on a fixed period.
pub struct Scheduler {
    store: Arc<dyn SensorStore>,
    config: MonitorConfig,
}

impl Scheduler {
    pub fn new(store: Arc<dyn SensorStore>, config: MonitorConfig) -> Self {
        Self { store, config }
    }

    /// Run the scheduler loop until the cancellation token is triggered.
    ///
    /// The first tick fires immediately.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            tick_period_ms = self.config.tick_period.as_millis() as u64,
            batch_size = self.config.batch_size.get(),
            "Sensor scheduler started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Sensor scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_tick().await {
                        tracing::error!(error = %e, "Sensor tick failed");
                    }
                }
            }
        }
    }

    /// One tick: evaluate every sensor once.
    ///
    /// Only a failure to list sensors is returned as an error. Failures and
    /// panics while evaluating a single sensor are logged and counted, and
    /// the remaining sensors are still processed.
    pub async fn run_tick(&self) -> Result<TickSummary, MonitorError> {
        tracing::debug!("Starting sensor tick");
        let sensors = self.store.list_sensors().await?;
        let mut summary = TickSummary::default();

        for sensor in &sensors {
            let sensor_id = sensor.id;
            let result = AssertUnwindSafe(self.run_sensor(sensor_id))
                .catch_unwind()
                .await
                .unwrap_or(Err(MonitorError::Panicked { sensor_id }));

            match result {
                Ok(SensorRun::Done(RunOutcome::Evaluated(_))) => summary.evaluated += 1,
                Ok(SensorRun::Done(RunOutcome::NoReadings)) => summary.idle += 1,
                Ok(SensorRun::Busy) => {
                    tracing::debug!(sensor_id, "Sensor already being evaluated, skipping");
                    summary.busy += 1;
                }
                Err(e) => {
                    tracing::error!(sensor_id, error = %e, "Failed to evaluate sensor");
                    summary.failed += 1;
                }
            }
        }

        if summary.total() > 0 {
            tracing::info!(
                sensors = summary.total(),
                evaluated = summary.evaluated,
                idle = summary.idle,
                busy = summary.busy,
                failed = summary.failed,
                "Sensor tick complete"
            );
        }

        Ok(summary)
    }

    async fn run_sensor(&self, sensor_id: DbId) -> Result<SensorRun, MonitorError> {
        let Some(unit) = self.store.begin(sensor_id).await? else {
            return Ok(SensorRun::Busy);
        };
        let outcome = process_sensor(unit, self.config.batch_size).await?;
        Ok(SensorRun::Done(outcome))
    }
}
