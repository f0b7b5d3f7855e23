//! Kind-addressed queries over the fleet collections.
//!
//! The integrity engine only knows entity kinds and column names; this
//! module maps those onto the concrete sea-orm entities. Nothing here is
//! aware of relations between collections.

use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::entity::{devices, readings, sensors, users, zones, EntityKind};

async fn count_eq<E, C>(db: &C, column: &'static str, id: Uuid) -> Result<u64, DbErr>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    E::find()
        .filter(Expr::col(Alias::new(column)).eq(id))
        .count(db)
        .await
}

/// Number of `kind` records whose `column` equals `id`.
pub async fn count_referencing<C: ConnectionTrait>(
    db: &C,
    kind: EntityKind,
    column: &'static str,
    id: Uuid,
) -> Result<u64, DbErr> {
    match kind {
        EntityKind::User => count_eq::<users::Entity, _>(db, column, id).await,
        EntityKind::Zone => count_eq::<zones::Entity, _>(db, column, id).await,
        EntityKind::Device => count_eq::<devices::Entity, _>(db, column, id).await,
        EntityKind::Sensor => count_eq::<sensors::Entity, _>(db, column, id).await,
        EntityKind::Reading => count_eq::<readings::Entity, _>(db, column, id).await,
    }
}

/// Whether a `kind` record with this id exists.
pub async fn exists<C: ConnectionTrait>(db: &C, kind: EntityKind, id: Uuid) -> Result<bool, DbErr> {
    Ok(count_referencing(db, kind, "id", id).await? > 0)
}
