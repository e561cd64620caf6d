//! Status enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "UPPERCASE")]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database status ID back into the enum.
            pub fn from_id(id: StatusId) -> Result<Self, CoreError> {
                match id {
                    $( v if v == $val => Ok(Self::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "unknown {} id {other}",
                        stringify!($name)
                    ))),
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl TryFrom<StatusId> for $name {
            type Error = CoreError;

            fn try_from(id: StatusId) -> Result<Self, Self::Error> {
                Self::from_id(id)
            }
        }
    };
}

define_status_enum! {
    /// Health classification of a sensor.
    ///
    /// Escalates OK -> WARN -> ALERT as batches of readings cross the
    /// sensor threshold, and drops back to OK on a fully quiet batch.
    SensorStatus {
        Ok = 1,
        Warn = 2,
        Alert = 3,
    }
}

impl Default for SensorStatus {
    fn default() -> Self {
        Self::Ok
    }
}

impl std::fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Alert => "ALERT",
        };
        f.write_str(label)
    }
}
