//! Referential integrity for a store without foreign keys.
//!
//! [`registry`] declares the references between kinds, [`IntegrityEngine`]
//! enforces them. Services expose their records to the engine through
//! [`Record`].

mod engine;
mod error;
pub mod registry;

use uuid::Uuid;

use crate::entity::EntityKind;

pub use engine::IntegrityEngine;
pub use error::IntegrityError;
pub use registry::{Cardinality, DeletePolicy, Relation, RELATIONS};

/// Field access the engine needs from a candidate, patch or stored record.
///
/// `field` is the registry's wire name for the reference. Kinds without
/// outgoing references keep the defaults.
pub trait Record {
    const KIND: EntityKind;

    /// Value of a scalar reference, `None` when unset.
    fn reference(&self, _field: &str) -> Option<Uuid> {
        None
    }

    /// Embedded list of references, `None` when the record has no such list.
    fn reference_list(&self, _field: &str) -> Option<&[Uuid]> {
        None
    }
}
