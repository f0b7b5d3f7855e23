use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::readings;
use crate::entity::sensors::{self, SensorType};
use crate::services::readings::ReadingWithSensor;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingResponse {
    pub id: Uuid,
    pub sensor_id: Uuid,
    pub time: DateTime<Utc>,
    pub value: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<readings::Model> for ReadingResponse {
    fn from(r: readings::Model) -> Self {
        Self {
            id: r.id,
            sensor_id: r.sensor_id,
            time: r.time,
            value: r.value,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Sensor fields exposed alongside a reading
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensorSummary {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub unit: String,
    pub location: String,
}

impl From<sensors::Model> for SensorSummary {
    fn from(s: sensors::Model) -> Self {
        Self {
            id: s.id,
            sensor_type: s.sensor_type,
            unit: s.unit,
            location: s.location,
        }
    }
}

/// A reading as returned by list and get. `sensor` is `null` when the
/// sensor no longer exists.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingDetailResponse {
    pub id: Uuid,
    pub sensor_id: Uuid,
    pub sensor: Option<SensorSummary>,
    pub time: DateTime<Utc>,
    pub value: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReadingWithSensor> for ReadingDetailResponse {
    fn from(expanded: ReadingWithSensor) -> Self {
        let r = expanded.reading;
        Self {
            id: r.id,
            sensor_id: r.sensor_id,
            sensor: expanded.sensor.map(SensorSummary::from),
            time: r.time,
            value: r.value,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}
