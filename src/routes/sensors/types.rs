use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::sensors::{self, SensorType};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensorResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub unit: String,
    pub model: Option<String>,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<sensors::Model> for SensorResponse {
    fn from(s: sensors::Model) -> Self {
        Self {
            id: s.id,
            sensor_type: s.sensor_type,
            unit: s.unit,
            model: s.model,
            location: s.location,
            is_active: s.is_active,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}
