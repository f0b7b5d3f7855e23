use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::devices::{self, DeviceStatus};
use crate::entity::{users, zones};
use crate::routes::sensors::SensorResponse;
use crate::services::devices::DeviceWithRelations;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub id: Uuid,
    pub serial_number: String,
    pub model: Option<String>,
    pub owner_id: Uuid,
    pub zone_id: Uuid,
    pub installed_at: DateTime<Utc>,
    pub status: DeviceStatus,
    /// Mounted sensors, in mounting order
    pub sensors: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<devices::Model> for DeviceResponse {
    fn from(d: devices::Model) -> Self {
        Self {
            id: d.id,
            serial_number: d.serial_number,
            model: d.model,
            owner_id: d.owner_id,
            zone_id: d.zone_id,
            installed_at: d.installed_at,
            status: d.status,
            sensors: d.sensors.0,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

/// Owner fields exposed alongside a device
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<users::Model> for OwnerSummary {
    fn from(u: users::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<zones::Model> for ZoneSummary {
    fn from(z: zones::Model) -> Self {
        Self {
            id: z.id,
            name: z.name,
        }
    }
}

/// A device as returned by list and get, with its references resolved.
///
/// `owner` and `zone` are `null` when the referenced record no longer
/// exists. `sensors` holds the mounted sensor records that still exist.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetailResponse {
    pub id: Uuid,
    pub serial_number: String,
    pub model: Option<String>,
    pub owner_id: Uuid,
    pub owner: Option<OwnerSummary>,
    pub zone_id: Uuid,
    pub zone: Option<ZoneSummary>,
    pub installed_at: DateTime<Utc>,
    pub status: DeviceStatus,
    pub sensors: Vec<SensorResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeviceWithRelations> for DeviceDetailResponse {
    fn from(expanded: DeviceWithRelations) -> Self {
        let d = expanded.device;
        Self {
            id: d.id,
            serial_number: d.serial_number,
            model: d.model,
            owner_id: d.owner_id,
            owner: expanded.owner.map(OwnerSummary::from),
            zone_id: d.zone_id,
            zone: expanded.zone.map(ZoneSummary::from),
            installed_at: d.installed_at,
            status: d.status,
            sensors: expanded.sensors.into_iter().map(SensorResponse::from).collect(),
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}
