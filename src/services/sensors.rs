use chrono::Utc;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{check_new, check_patch, delete_guarded, find_existing, require_text};
use crate::entity::sensors::{self, SensorType};
use crate::entity::EntityKind;
use crate::error::AppResult;
use crate::integrity::Record;

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSensor {
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub unit: String,
    pub model: Option<String>,
    pub location: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensorPatch {
    #[serde(rename = "type")]
    pub sensor_type: Option<SensorType>,
    pub unit: Option<String>,
    /// Omit to keep, `null` to clear
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub model: Option<Option<String>>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SensorFilter {
    /// Filter by sensor type
    #[serde(rename = "type")]
    pub sensor_type: Option<SensorType>,
    /// Filter by active flag
    pub is_active: Option<bool>,
}

impl Record for NewSensor {
    const KIND: EntityKind = EntityKind::Sensor;
}

impl Record for SensorPatch {
    const KIND: EntityKind = EntityKind::Sensor;
}

impl Record for sensors::Model {
    const KIND: EntityKind = EntityKind::Sensor;
}

pub async fn list<C: ConnectionTrait>(db: &C, filter: SensorFilter) -> AppResult<Vec<sensors::Model>> {
    let mut query = sensors::Entity::find();

    if let Some(sensor_type) = filter.sensor_type {
        query = query.filter(sensors::Column::SensorType.eq(sensor_type));
    }

    if let Some(is_active) = filter.is_active {
        query = query.filter(sensors::Column::IsActive.eq(is_active));
    }

    Ok(query
        .order_by_asc(sensors::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<sensors::Model> {
    find_existing::<sensors::Entity, _>(db, id).await
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewSensor) -> AppResult<sensors::Model> {
    require_text("unit", &input.unit)?;
    require_text("location", &input.location)?;
    check_new(db, &input).await?;

    let sensor = sensors::ActiveModel {
        sensor_type: Set(input.sensor_type),
        unit: Set(input.unit),
        model: Set(input.model),
        location: Set(input.location),
        is_active: Set(input.is_active),
        ..sensors::ActiveModel::new()
    }
    .insert(db)
    .await?;

    tracing::info!(id = %sensor.id, sensor_type = ?sensor.sensor_type, "Sensor created");
    Ok(sensor)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    patch: SensorPatch,
) -> AppResult<sensors::Model> {
    let existing = find_existing::<sensors::Entity, _>(db, id).await?;
    check_patch(db, &patch).await?;

    let mut sensor: sensors::ActiveModel = existing.into();
    if let Some(sensor_type) = patch.sensor_type {
        sensor.sensor_type = Set(sensor_type);
    }
    if let Some(unit) = patch.unit {
        require_text("unit", &unit)?;
        sensor.unit = Set(unit);
    }
    if let Some(model) = patch.model {
        sensor.model = Set(model);
    }
    if let Some(location) = patch.location {
        require_text("location", &location)?;
        sensor.location = Set(location);
    }
    if let Some(is_active) = patch.is_active {
        sensor.is_active = Set(is_active);
    }
    sensor.updated_at = Set(Utc::now());

    Ok(sensor.update(db).await?)
}

/// Refused while the sensor has recorded readings. Devices listing the
/// sensor do not block this.
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<sensors::Model> {
    let sensor = find_existing::<sensors::Entity, _>(db, id).await?;
    delete_guarded::<sensors::Entity, _>(db, id, &sensor).await?;
    Ok(sensor)
}
