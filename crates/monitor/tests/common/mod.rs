//! In-memory [`SensorStore`] used by the monitor integration tests.
//!
//! Mirrors the Postgres store's contract: units hold a per-sensor lock until
//! they are committed or dropped, and staged writes only become visible on
//! commit. Failure and panic injection hooks let tests break individual
//! sensors.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use sensorwatch_core::error::CoreError;
use sensorwatch_core::evaluation::{NewAlertEpisode, ReadingSample};
use sensorwatch_core::status::SensorStatus;
use sensorwatch_core::types::{DbId, Timestamp};
use sensorwatch_db::models::sensor::Sensor;
use sensorwatch_monitor::{MonitorError, SensorStore, SensorUnit};

pub const THRESHOLD: i32 = 2000;

/// Fixed creation time for every test sensor.
pub fn created_at() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// `n` seconds after sensor creation.
pub fn at(n: i64) -> Timestamp {
    created_at() + Duration::seconds(n)
}

#[derive(Default)]
struct Inner {
    next_id: DbId,
    sensors: BTreeMap<DbId, Sensor>,
    readings: Vec<(DbId, ReadingSample)>,
    alerts: Vec<(DbId, NewAlertEpisode)>,
    locked: HashSet<DbId>,
    fail_reads: HashSet<DbId>,
    fail_alert_writes: HashSet<DbId>,
    panic_reads: HashSet<DbId>,
    list_fails: bool,
    commits: usize,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sensor(&self, status: SensorStatus) -> DbId {
        let mut inner = lock(&self.inner);
        inner.next_id += 1;
        let id = inner.next_id;
        inner.sensors.insert(
            id,
            Sensor {
                id,
                threshold: THRESHOLD,
                status_id: status.id(),
                last_window_at: None,
                created_at: created_at(),
            },
        );
        id
    }

    /// Add readings one second apart, continuing after the latest stored one.
    pub fn add_readings(&self, sensor_id: DbId, values: &[i32]) -> Vec<Timestamp> {
        let mut inner = lock(&self.inner);
        let mut next = inner
            .readings
            .iter()
            .filter(|(id, _)| *id == sensor_id)
            .map(|(_, r)| r.recorded_at)
            .max()
            .unwrap_or_else(created_at)
            + Duration::seconds(1);

        let mut stamps = Vec::new();
        for &value in values {
            inner.readings.push((
                sensor_id,
                ReadingSample {
                    value,
                    recorded_at: next,
                },
            ));
            stamps.push(next);
            next += Duration::seconds(1);
        }
        stamps
    }

    pub fn sensor(&self, id: DbId) -> Sensor {
        lock(&self.inner).sensors[&id].clone()
    }

    pub fn status(&self, id: DbId) -> SensorStatus {
        self.sensor(id).status().unwrap()
    }

    pub fn cursor(&self, id: DbId) -> Option<Timestamp> {
        self.sensor(id).last_window_at
    }

    pub fn alerts(&self, id: DbId) -> Vec<NewAlertEpisode> {
        lock(&self.inner)
            .alerts
            .iter()
            .filter(|(sid, _)| *sid == id)
            .map(|(_, a)| a.clone())
            .collect()
    }

    pub fn commits(&self) -> usize {
        lock(&self.inner).commits
    }

    pub fn fail_reads_for(&self, id: DbId) {
        lock(&self.inner).fail_reads.insert(id);
    }

    pub fn fail_alert_writes_for(&self, id: DbId) {
        lock(&self.inner).fail_alert_writes.insert(id);
    }

    pub fn panic_on_read_for(&self, id: DbId) {
        lock(&self.inner).panic_reads.insert(id);
    }

    pub fn clear_failures(&self, id: DbId) {
        let mut inner = lock(&self.inner);
        inner.fail_reads.remove(&id);
        inner.fail_alert_writes.remove(&id);
        inner.panic_reads.remove(&id);
    }

    pub fn fail_listing(&self) {
        lock(&self.inner).list_fails = true;
    }

    /// Hold a sensor as if another run were in flight.
    pub fn hold(&self, id: DbId) {
        lock(&self.inner).locked.insert(id);
    }

    pub fn release(&self, id: DbId) {
        lock(&self.inner).locked.remove(&id);
    }
}

#[async_trait]
impl SensorStore for MemoryStore {
    async fn list_sensors(&self) -> Result<Vec<Sensor>, MonitorError> {
        let inner = lock(&self.inner);
        if inner.list_fails {
            return Err(CoreError::Internal("sensor listing unavailable".into()).into());
        }
        Ok(inner.sensors.values().cloned().collect())
    }

    async fn begin(&self, sensor_id: DbId) -> Result<Option<Box<dyn SensorUnit>>, MonitorError> {
        let mut inner = lock(&self.inner);
        let Some(sensor) = inner.sensors.get(&sensor_id).cloned() else {
            return Ok(None);
        };
        if !inner.locked.insert(sensor_id) {
            return Ok(None);
        }
        Ok(Some(Box::new(MemoryUnit {
            inner: Arc::clone(&self.inner),
            sensor,
            staged_sensor: None,
            staged_alerts: Vec::new(),
        })))
    }
}

struct MemoryUnit {
    inner: Arc<Mutex<Inner>>,
    sensor: Sensor,
    staged_sensor: Option<(SensorStatus, Option<Timestamp>)>,
    staged_alerts: Vec<NewAlertEpisode>,
}

#[async_trait]
impl SensorUnit for MemoryUnit {
    fn sensor(&self) -> &Sensor {
        &self.sensor
    }

    async fn readings_after(
        &mut self,
        after: Timestamp,
    ) -> Result<Vec<ReadingSample>, MonitorError> {
        let (should_panic, should_fail, mut readings) = {
            let inner = lock(&self.inner);
            let readings: Vec<ReadingSample> = inner
                .readings
                .iter()
                .filter(|(id, r)| *id == self.sensor.id && r.recorded_at > after)
                .map(|(_, r)| *r)
                .collect();
            (
                inner.panic_reads.contains(&self.sensor.id),
                inner.fail_reads.contains(&self.sensor.id),
                readings,
            )
        };

        if should_panic {
            panic!("injected panic for sensor {}", self.sensor.id);
        }
        if should_fail {
            return Err(CoreError::Internal("injected read failure".into()).into());
        }

        readings.sort_by_key(|r| r.recorded_at);
        Ok(readings)
    }

    async fn save_sensor(
        &mut self,
        status: SensorStatus,
        cursor: Option<Timestamp>,
    ) -> Result<(), MonitorError> {
        self.staged_sensor = Some((status, cursor));
        Ok(())
    }

    async fn save_alerts(&mut self, alerts: &[NewAlertEpisode]) -> Result<u64, MonitorError> {
        if lock(&self.inner).fail_alert_writes.contains(&self.sensor.id) {
            return Err(CoreError::Internal("injected alert write failure".into()).into());
        }
        self.staged_alerts.extend_from_slice(alerts);
        Ok(alerts.len() as u64)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), MonitorError> {
        let shared = Arc::clone(&self.inner);
        let mut inner = lock(&shared);
        let id = self.sensor.id;

        if let Some((status, cursor)) = self.staged_sensor.take() {
            if let Some(row) = inner.sensors.get_mut(&id) {
                row.status_id = status.id();
                row.last_window_at = row.last_window_at.max(cursor);
            }
        }
        for alert in self.staged_alerts.drain(..) {
            inner.alerts.push((id, alert));
        }
        inner.commits += 1;
        Ok(())
    }
}

impl Drop for MemoryUnit {
    fn drop(&mut self) {
        lock(&self.inner).locked.remove(&self.sensor.id);
    }
}
