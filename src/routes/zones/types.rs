use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::zones;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<zones::Model> for ZoneResponse {
    fn from(z: zones::Model) -> Self {
        Self {
            id: z.id,
            name: z.name,
            description: z.description,
            is_active: z.is_active,
            created_at: z.created_at,
            updated_at: z.updated_at,
        }
    }
}
