//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Read paths used by HTTP handlers accept `&PgPool`; paths that take part in
//! a sensor evaluation accept `&mut PgConnection` so the caller can run them
//! inside one transaction.

pub mod alert_repo;
pub mod reading_repo;
pub mod sensor_repo;

pub use alert_repo::AlertRepo;
pub use reading_repo::ReadingRepo;
pub use sensor_repo::SensorRepo;
