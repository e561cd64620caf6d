//! Row models and DTOs, one module per table.

pub mod alert;
pub mod reading;
pub mod sensor;
