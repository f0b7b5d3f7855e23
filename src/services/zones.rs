use chrono::Utc;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{check_new, check_patch, delete_guarded, find_existing, require_text};
use crate::entity::zones;
use crate::entity::EntityKind;
use crate::error::AppResult;
use crate::integrity::Record;

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewZone {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZonePatch {
    pub name: Option<String>,
    /// Omit to keep, `null` to clear
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl Record for NewZone {
    const KIND: EntityKind = EntityKind::Zone;
}

impl Record for ZonePatch {
    const KIND: EntityKind = EntityKind::Zone;
}

impl Record for zones::Model {
    const KIND: EntityKind = EntityKind::Zone;
}

pub async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<zones::Model>> {
    Ok(zones::Entity::find()
        .order_by_asc(zones::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<zones::Model> {
    find_existing::<zones::Entity, _>(db, id).await
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewZone) -> AppResult<zones::Model> {
    require_text("name", &input.name)?;
    check_new(db, &input).await?;

    let zone = zones::ActiveModel {
        name: Set(input.name),
        description: Set(input.description),
        is_active: Set(input.is_active),
        ..zones::ActiveModel::new()
    }
    .insert(db)
    .await?;

    tracing::info!(id = %zone.id, name = %zone.name, "Zone created");
    Ok(zone)
}

pub async fn update<C: ConnectionTrait>(db: &C, id: Uuid, patch: ZonePatch) -> AppResult<zones::Model> {
    let existing = find_existing::<zones::Entity, _>(db, id).await?;
    check_patch(db, &patch).await?;

    let mut zone: zones::ActiveModel = existing.into();
    if let Some(name) = patch.name {
        require_text("name", &name)?;
        zone.name = Set(name);
    }
    if let Some(description) = patch.description {
        zone.description = Set(description);
    }
    if let Some(is_active) = patch.is_active {
        zone.is_active = Set(is_active);
    }
    zone.updated_at = Set(Utc::now());

    Ok(zone.update(db).await?)
}

/// Refused while any device is assigned to the zone.
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<zones::Model> {
    let zone = find_existing::<zones::Entity, _>(db, id).await?;
    delete_guarded::<zones::Entity, _>(db, id, &zone).await?;
    Ok(zone)
}
