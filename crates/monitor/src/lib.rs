//! Sensorwatch monitor: periodic status evaluation for every sensor.
//!
//! - [`processor`] -- runs the window evaluator for one sensor inside a unit
//!   of work and persists the result.
//! - [`scheduler`] -- ticks on a fixed period and drives the processor for
//!   every registered sensor, isolating failures per sensor.
//! - [`store`] -- the storage seam ([`SensorStore`], [`SensorUnit`]).
//! - [`pg_store`] -- the Postgres implementation of that seam.

pub mod config;
pub mod error;
pub mod pg_store;
pub mod processor;
pub mod scheduler;
pub mod store;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use pg_store::PgSensorStore;
pub use scheduler::{Scheduler, TickSummary};
pub use store::{SensorStore, SensorUnit};
