//! sea-orm entities for the fleet collections.
//!
//! The schema carries no foreign keys, so none of these entities declare
//! relations. Cross-collection references are described once in
//! [`crate::integrity::registry`] instead.

use std::fmt;

pub mod devices;
pub mod readings;
pub mod sensors;
pub mod users;
pub mod zones;

/// One of the five stored collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Zone,
    Device,
    Sensor,
    Reading,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "User",
            Self::Zone => "Zone",
            Self::Device => "Device",
            Self::Sensor => "Sensor",
            Self::Reading => "Reading",
        };
        f.write_str(name)
    }
}
