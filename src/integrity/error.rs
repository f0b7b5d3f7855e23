use uuid::Uuid;

use crate::entity::EntityKind;

/// Why a write or delete was refused by the integrity layer.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    #[error("{target} with ID {id} does not exist (referenced by `{field}`)")]
    MissingReference {
        field: &'static str,
        target: EntityKind,
        id: Uuid,
    },

    #[error("`{field}` is required")]
    UnsetReference { field: &'static str },

    #[error(
        "Cannot delete: {count} {dependent} record(s) still reference it through `{field}`"
    )]
    DependentsExist {
        dependent: EntityKind,
        field: &'static str,
        count: u64,
    },

    #[error("Cannot delete: `{field}` still lists {len} item(s); detach them first")]
    ListNotEmpty { field: &'static str, len: usize },

    #[error("Store error during integrity check: {0}")]
    Store(#[from] sea_orm::DbErr),
}

impl IntegrityError {
    /// Refused deletes, as opposed to rejected writes.
    #[must_use]
    pub fn is_delete_guard(&self) -> bool {
        matches!(self, Self::DependentsExist { .. } | Self::ListNotEmpty { .. })
    }
}
