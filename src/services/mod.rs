//! One service per entity kind.
//!
//! Services are the only callers of the integrity engine. Each write goes
//! through the same sequence: field checks, reference checks, then the
//! store call. A refused operation never reaches the store.

pub mod devices;
pub mod readings;
pub mod sensors;
pub mod users;
pub mod zones;

use std::collections::{HashMap, HashSet};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PrimaryKeyTrait, QueryFilter};
use uuid::Uuid;

use crate::entity::EntityKind;
use crate::error::{AppError, AppResult};
use crate::integrity::{IntegrityEngine, IntegrityError, Record};

pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> AppError {
    AppError::NotFound(format!("{kind} '{id}' not found"))
}

pub(crate) fn require_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("`{field}` must not be empty")));
    }
    Ok(())
}

fn log_refused_write(kind: EntityKind, err: &IntegrityError) {
    if !matches!(err, IntegrityError::Store(_)) {
        tracing::warn!(%kind, error = %err, "Write refused");
    }
}

/// Resolve every required reference of a record about to be inserted.
pub(crate) async fn check_new<R, C>(db: &C, candidate: &R) -> AppResult<()>
where
    R: Record,
    C: ConnectionTrait,
{
    IntegrityEngine::new(db)
        .validate_references(candidate)
        .await
        .inspect_err(|err| log_refused_write(R::KIND, err))?;
    Ok(())
}

/// Resolve the references a patch changes.
pub(crate) async fn check_patch<R, C>(db: &C, patch: &R) -> AppResult<()>
where
    R: Record,
    C: ConnectionTrait,
{
    IntegrityEngine::new(db)
        .validate_changed_references(patch)
        .await
        .inspect_err(|err| log_refused_write(R::KIND, err))?;
    Ok(())
}

/// Load a record or fail with `NotFound`.
pub(crate) async fn find_existing<E, C>(db: &C, id: Uuid) -> AppResult<E::Model>
where
    E: EntityTrait,
    E::Model: Record,
    C: ConnectionTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    E::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| not_found(<E::Model as Record>::KIND, id))
}

/// Fetch the records with the given ids in one query, keyed by id.
///
/// Ids with no stored record are simply absent from the map.
pub(crate) async fn load_by_ids<E, C>(
    db: &C,
    id_column: E::Column,
    ids: impl IntoIterator<Item = Uuid>,
    key: fn(&E::Model) -> Uuid,
) -> AppResult<HashMap<Uuid, E::Model>>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let ids: HashSet<Uuid> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = E::find().filter(id_column.is_in(ids)).all(db).await?;
    Ok(rows.into_iter().map(|row| (key(&row), row)).collect())
}

/// Remove `record` once nothing depends on it.
///
/// The dependent check and the delete are separate statements; see
/// [`IntegrityEngine`] for the resulting race.
pub(crate) async fn delete_guarded<E, C>(db: &C, id: Uuid, record: &E::Model) -> AppResult<()>
where
    E: EntityTrait,
    E::Model: Record,
    C: ConnectionTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let kind = <E::Model as Record>::KIND;

    if let Err(err) = IntegrityEngine::new(db).check_deletable(id, record).await {
        if err.is_delete_guard() {
            tracing::warn!(%kind, %id, error = %err, "Delete refused");
        }
        return Err(err.into());
    }

    let result = E::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found(kind, id));
    }

    tracing::info!(%kind, %id, "Record deleted");
    Ok(())
}
