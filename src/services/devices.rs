//! Devices reference their owner and zone, and embed the ordered list of
//! sensors mounted on them.
//!
//! The sensor list guards the device itself: a device that still lists
//! sensors cannot be deleted until they are detached with an update.
//! Listed sensor ids are stored as given.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{
    check_new, check_patch, delete_guarded, find_existing, load_by_ids, not_found, require_text,
};
use crate::entity::devices::{self, DeviceStatus, SensorIds};
use crate::entity::{sensors, users, zones, EntityKind};
use crate::error::AppResult;
use crate::integrity::Record;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub serial_number: String,
    pub model: Option<String>,
    pub owner_id: Uuid,
    pub zone_id: Uuid,
    /// Defaults to the time of creation
    pub installed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub sensors: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DevicePatch {
    pub serial_number: Option<String>,
    /// Omit to keep, `null` to clear
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub model: Option<Option<String>>,
    pub owner_id: Option<Uuid>,
    pub zone_id: Option<Uuid>,
    pub installed_at: Option<DateTime<Utc>>,
    pub status: Option<DeviceStatus>,
    /// Replaces the whole list; send `[]` to detach every sensor
    pub sensors: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFilter {
    /// Filter by owning user
    pub owner_id: Option<Uuid>,
    /// Filter by zone
    pub zone_id: Option<Uuid>,
    /// Filter by status
    pub status: Option<DeviceStatus>,
}

/// A device together with the records its references resolve to.
///
/// A reference whose target is gone leaves `owner` or `zone` empty, and a
/// listed sensor that is gone is left out of `sensors`.
#[derive(Debug, Clone)]
pub struct DeviceWithRelations {
    pub device: devices::Model,
    pub owner: Option<users::Model>,
    pub zone: Option<zones::Model>,
    /// Mounted sensors in listing order
    pub sensors: Vec<sensors::Model>,
}

impl Record for NewDevice {
    const KIND: EntityKind = EntityKind::Device;

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "ownerId" => Some(self.owner_id),
            "zoneId" => Some(self.zone_id),
            _ => None,
        }
    }

    fn reference_list(&self, field: &str) -> Option<&[Uuid]> {
        (field == "sensors").then_some(self.sensors.as_slice())
    }
}

impl Record for DevicePatch {
    const KIND: EntityKind = EntityKind::Device;

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "ownerId" => self.owner_id,
            "zoneId" => self.zone_id,
            _ => None,
        }
    }

    fn reference_list(&self, field: &str) -> Option<&[Uuid]> {
        match field {
            "sensors" => self.sensors.as_deref(),
            _ => None,
        }
    }
}

impl Record for devices::Model {
    const KIND: EntityKind = EntityKind::Device;

    fn reference(&self, field: &str) -> Option<Uuid> {
        match field {
            "ownerId" => Some(self.owner_id),
            "zoneId" => Some(self.zone_id),
            _ => None,
        }
    }

    fn reference_list(&self, field: &str) -> Option<&[Uuid]> {
        (field == "sensors").then_some(self.sensors.0.as_slice())
    }
}

pub async fn list<C: ConnectionTrait>(db: &C, filter: DeviceFilter) -> AppResult<Vec<devices::Model>> {
    let mut query = devices::Entity::find();

    if let Some(owner_id) = filter.owner_id {
        query = query.filter(devices::Column::OwnerId.eq(owner_id));
    }

    if let Some(zone_id) = filter.zone_id {
        query = query.filter(devices::Column::ZoneId.eq(zone_id));
    }

    if let Some(status) = filter.status {
        query = query.filter(devices::Column::Status.eq(status));
    }

    Ok(query
        .order_by_asc(devices::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<devices::Model> {
    find_existing::<devices::Entity, _>(db, id).await
}

/// Resolve owners, zones and mounted sensors for a batch of devices with
/// one query per referenced collection.
pub async fn with_relations<C: ConnectionTrait>(
    db: &C,
    devices_list: Vec<devices::Model>,
) -> AppResult<Vec<DeviceWithRelations>> {
    let owners = load_by_ids::<users::Entity, _>(
        db,
        users::Column::Id,
        devices_list.iter().map(|d| d.owner_id),
        |u| u.id,
    )
    .await?;
    let zones_by_id = load_by_ids::<zones::Entity, _>(
        db,
        zones::Column::Id,
        devices_list.iter().map(|d| d.zone_id),
        |z| z.id,
    )
    .await?;
    let sensors_by_id = load_by_ids::<sensors::Entity, _>(
        db,
        sensors::Column::Id,
        devices_list.iter().flat_map(|d| d.sensors.0.iter().copied()),
        |s| s.id,
    )
    .await?;

    Ok(devices_list
        .into_iter()
        .map(|device| DeviceWithRelations {
            owner: owners.get(&device.owner_id).cloned(),
            zone: zones_by_id.get(&device.zone_id).cloned(),
            sensors: device
                .sensors
                .0
                .iter()
                .filter_map(|id| sensors_by_id.get(id).cloned())
                .collect(),
            device,
        })
        .collect())
}

/// Devices matching `filter` with their references resolved.
pub async fn list_with_relations<C: ConnectionTrait>(
    db: &C,
    filter: DeviceFilter,
) -> AppResult<Vec<DeviceWithRelations>> {
    let devices_list = list(db, filter).await?;
    with_relations(db, devices_list).await
}

/// One device with its references resolved.
pub async fn get_with_relations<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> AppResult<DeviceWithRelations> {
    let device = get(db, id).await?;
    with_relations(db, vec![device])
        .await?
        .pop()
        .ok_or_else(|| not_found(EntityKind::Device, id))
}

/// Owner and zone must exist before the device is stored.
pub async fn create<C: ConnectionTrait>(db: &C, input: NewDevice) -> AppResult<devices::Model> {
    require_text("serialNumber", &input.serial_number)?;
    check_new(db, &input).await?;

    let mut device = devices::ActiveModel {
        serial_number: Set(input.serial_number),
        model: Set(input.model),
        owner_id: Set(input.owner_id),
        zone_id: Set(input.zone_id),
        status: Set(input.status),
        sensors: Set(SensorIds(input.sensors)),
        ..devices::ActiveModel::new()
    };
    if let Some(installed_at) = input.installed_at {
        device.installed_at = Set(installed_at);
    }

    let device = device.insert(db).await?;
    tracing::info!(
        id = %device.id,
        serial_number = %device.serial_number,
        owner_id = %device.owner_id,
        zone_id = %device.zone_id,
        "Device created"
    );
    Ok(device)
}

/// A changed owner or zone is resolved again before the write.
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    patch: DevicePatch,
) -> AppResult<devices::Model> {
    let existing = find_existing::<devices::Entity, _>(db, id).await?;
    check_patch(db, &patch).await?;

    let mut device: devices::ActiveModel = existing.into();
    if let Some(serial_number) = patch.serial_number {
        require_text("serialNumber", &serial_number)?;
        device.serial_number = Set(serial_number);
    }
    if let Some(model) = patch.model {
        device.model = Set(model);
    }
    if let Some(owner_id) = patch.owner_id {
        device.owner_id = Set(owner_id);
    }
    if let Some(zone_id) = patch.zone_id {
        device.zone_id = Set(zone_id);
    }
    if let Some(installed_at) = patch.installed_at {
        device.installed_at = Set(installed_at);
    }
    if let Some(status) = patch.status {
        device.status = Set(status);
    }
    if let Some(sensors) = patch.sensors {
        device.sensors = Set(SensorIds(sensors));
    }
    device.updated_at = Set(Utc::now());

    let device = device.update(db).await?;
    tracing::debug!(%id, sensors = device.sensors.0.len(), "Device updated");
    Ok(device)
}

/// Refused while the device still lists sensors.
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<devices::Model> {
    let device = find_existing::<devices::Entity, _>(db, id).await?;
    delete_guarded::<devices::Entity, _>(db, id, &device).await?;
    Ok(device)
}
