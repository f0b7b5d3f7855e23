//! Declarative description of every reference between entity kinds.
//!
//! Adding a relation means adding one [`Relation`] to [`RELATIONS`]; the
//! engine picks it up for both write validation and delete guarding.

use crate::entity::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// A single identity stored in a scalar column.
    One,
    /// A list of identities embedded in the source record.
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Refuse to delete the target while any source record points at it.
    Restrict,
    /// Refuse to delete the source itself while its own list is non-empty.
    SelfGuard,
}

/// A directed edge `source.field -> target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub source: EntityKind,
    /// Wire name, used in error messages.
    pub field: &'static str,
    /// Store column holding the reference.
    pub column: &'static str,
    pub target: EntityKind,
    pub cardinality: Cardinality,
    pub required: bool,
    pub on_delete: DeletePolicy,
}

impl Relation {
    /// Scalar reference that must resolve before the source is written.
    #[must_use]
    pub fn is_required_one(&self) -> bool {
        self.cardinality == Cardinality::One && self.required
    }
}

pub static RELATIONS: &[Relation] = &[
    Relation {
        source: EntityKind::Device,
        field: "ownerId",
        column: "owner_id",
        target: EntityKind::User,
        cardinality: Cardinality::One,
        required: true,
        on_delete: DeletePolicy::Restrict,
    },
    Relation {
        source: EntityKind::Device,
        field: "zoneId",
        column: "zone_id",
        target: EntityKind::Zone,
        cardinality: Cardinality::One,
        required: true,
        on_delete: DeletePolicy::Restrict,
    },
    Relation {
        source: EntityKind::Reading,
        field: "sensorId",
        column: "sensor_id",
        target: EntityKind::Sensor,
        cardinality: Cardinality::One,
        required: true,
        on_delete: DeletePolicy::Restrict,
    },
    Relation {
        source: EntityKind::Device,
        field: "sensors",
        column: "sensors",
        target: EntityKind::Sensor,
        cardinality: Cardinality::Many,
        required: false,
        on_delete: DeletePolicy::SelfGuard,
    },
];

/// Edges leaving `kind`, in registry order.
pub fn outgoing(relations: &[Relation], kind: EntityKind) -> impl Iterator<Item = &Relation> {
    relations.iter().filter(move |r| r.source == kind)
}

/// Edges pointing at `kind`, in registry order.
pub fn incoming(relations: &[Relation], kind: EntityKind) -> impl Iterator<Item = &Relation> {
    relations.iter().filter(move |r| r.target == kind)
}
