use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{check_new, check_patch, delete_guarded, find_existing, load_by_ids, not_found};
use crate::entity::{readings, sensors, EntityKind};
use crate::error::{AppError, AppResult};
use crate::integrity::Record;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewReading {
    pub sensor_id: Uuid,
    /// Defaults to the time of creation
    pub time: Option<DateTime<Utc>>,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPatch {
    pub sensor_id: Option<Uuid>,
    pub time: Option<DateTime<Utc>>,
    pub value: Option<f64>,
}

/// A reading with the sensor it was taken by, `None` once that sensor is gone.
#[derive(Debug, Clone)]
pub struct ReadingWithSensor {
    pub reading: readings::Model,
    pub sensor: Option<sensors::Model>,
}

/// Optional inclusive bounds on reading time.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct TimeRange {
    /// Start time (optional, ISO 8601)
    pub start: Option<DateTime<Utc>>,
    /// End time (optional, ISO 8601)
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    fn validate(&self) -> AppResult<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end <= start {
                return Err(AppError::BadRequest(
                    "end time must be after start time".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Record for NewReading {
    const KIND: EntityKind = EntityKind::Reading;

    fn reference(&self, field: &str) -> Option<Uuid> {
        (field == "sensorId").then_some(self.sensor_id)
    }
}

impl Record for ReadingPatch {
    const KIND: EntityKind = EntityKind::Reading;

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "sensorId" => self.sensor_id,
            _ => None,
        }
    }
}

impl Record for readings::Model {
    const KIND: EntityKind = EntityKind::Reading;

    fn reference(&self, field: &str) -> Option<Uuid> {
        (field == "sensorId").then_some(self.sensor_id)
    }
}

/// All readings, most recent first.
pub async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<readings::Model>> {
    Ok(readings::Entity::find()
        .order_by_desc(readings::Column::Time)
        .all(db)
        .await?)
}

/// Readings of one sensor, most recent first. An unknown sensor yields an
/// empty list.
pub async fn list_by_sensor<C: ConnectionTrait>(
    db: &C,
    sensor_id: Uuid,
    range: TimeRange,
) -> AppResult<Vec<readings::Model>> {
    range.validate()?;

    let mut query = readings::Entity::find().filter(readings::Column::SensorId.eq(sensor_id));

    if let Some(start) = range.start {
        query = query.filter(readings::Column::Time.gte(start));
    }

    if let Some(end) = range.end {
        query = query.filter(readings::Column::Time.lte(end));
    }

    Ok(query
        .order_by_desc(readings::Column::Time)
        .all(db)
        .await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<readings::Model> {
    find_existing::<readings::Entity, _>(db, id).await
}

/// Attach each reading's sensor, loading all sensors in one query.
pub async fn with_sensor<C: ConnectionTrait>(
    db: &C,
    readings_list: Vec<readings::Model>,
) -> AppResult<Vec<ReadingWithSensor>> {
    let sensors_by_id = load_by_ids::<sensors::Entity, _>(
        db,
        sensors::Column::Id,
        readings_list.iter().map(|r| r.sensor_id),
        |s| s.id,
    )
    .await?;

    Ok(readings_list
        .into_iter()
        .map(|reading| ReadingWithSensor {
            sensor: sensors_by_id.get(&reading.sensor_id).cloned(),
            reading,
        })
        .collect())
}

/// All readings, most recent first, each with its sensor.
pub async fn list_with_sensor<C: ConnectionTrait>(db: &C) -> AppResult<Vec<ReadingWithSensor>> {
    let readings_list = list(db).await?;
    with_sensor(db, readings_list).await
}

/// One reading with its sensor.
pub async fn get_with_sensor<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<ReadingWithSensor> {
    let reading = get(db, id).await?;
    with_sensor(db, vec![reading])
        .await?
        .pop()
        .ok_or_else(|| not_found(EntityKind::Reading, id))
}

/// The sensor must exist before the reading is stored.
pub async fn create<C: ConnectionTrait>(db: &C, input: NewReading) -> AppResult<readings::Model> {
    check_new(db, &input).await?;

    let mut reading = readings::ActiveModel {
        sensor_id: Set(input.sensor_id),
        value: Set(input.value),
        ..readings::ActiveModel::new()
    };
    if let Some(time) = input.time {
        reading.time = Set(time);
    }

    let reading = reading.insert(db).await?;
    tracing::debug!(id = %reading.id, sensor_id = %reading.sensor_id, value = reading.value, "Reading stored");
    Ok(reading)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    patch: ReadingPatch,
) -> AppResult<readings::Model> {
    let existing = find_existing::<readings::Entity, _>(db, id).await?;
    check_patch(db, &patch).await?;

    let mut reading: readings::ActiveModel = existing.into();
    if let Some(sensor_id) = patch.sensor_id {
        reading.sensor_id = Set(sensor_id);
    }
    if let Some(time) = patch.time {
        reading.time = Set(time);
    }
    if let Some(value) = patch.value {
        reading.value = Set(value);
    }
    reading.updated_at = Set(Utc::now());

    Ok(reading.update(db).await?)
}

/// Readings have no dependents; the guard passes trivially.
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<readings::Model> {
    let reading = find_existing::<readings::Entity, _>(db, id).await?;
    delete_guarded::<readings::Entity, _>(db, id, &reading).await?;
    Ok(reading)
}
