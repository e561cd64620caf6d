//! Sensorwatch domain logic.
//!
//! Pure types and rules shared by the storage, monitor, and API crates.
//! Nothing in here touches the database or the network.

pub mod error;
pub mod evaluation;
pub mod status;
pub mod types;
