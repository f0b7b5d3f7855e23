use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::common::{ApiJson, ApiPath, ApiQuery, AppState};
use crate::error::AppResult;
use crate::services::devices::{self as device_service, DeviceFilter, DevicePatch, NewDevice};

use super::types::{DeviceDetailResponse, DeviceResponse};

/// List all devices with their owner, zone and mounted sensors
#[utoipa::path(
    get,
    path = "/api/devices",
    params(DeviceFilter),
    responses(
        (status = 200, description = "Devices retrieved successfully", body = Vec<DeviceDetailResponse>),
    ),
    tag = "devices"
)]
pub async fn list_devices(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<DeviceFilter>,
) -> AppResult<Json<Vec<DeviceDetailResponse>>> {
    let devices_list = device_service::list_with_relations(&state.db, filter).await?;
    Ok(Json(
        devices_list.into_iter().map(DeviceDetailResponse::from).collect(),
    ))
}

/// Get a specific device by ID, with its owner, zone and mounted sensors
#[utoipa::path(
    get,
    path = "/api/devices/{device_id}",
    params(
        ("device_id" = Uuid, Path, description = "Device ID"),
    ),
    responses(
        (status = 200, description = "Device retrieved successfully", body = DeviceDetailResponse),
        (status = 404, description = "Device not found"),
    ),
    tag = "devices"
)]
pub async fn get_device(
    State(state): State<AppState>,
    ApiPath(device_id): ApiPath<Uuid>,
) -> AppResult<Json<DeviceDetailResponse>> {
    let device = device_service::get_with_relations(&state.db, device_id).await?;
    Ok(Json(device.into()))
}

/// Register a device
///
/// `ownerId` and `zoneId` must reference an existing user and zone.
#[utoipa::path(
    post,
    path = "/api/devices",
    request_body = NewDevice,
    responses(
        (status = 201, description = "Device created", body = DeviceResponse),
        (status = 409, description = "Serial number already registered"),
        (status = 422, description = "Owner or zone does not exist"),
    ),
    tag = "devices"
)]
pub async fn create_device(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewDevice>,
) -> AppResult<(StatusCode, Json<DeviceResponse>)> {
    let device = device_service::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(device.into())))
}

/// Update a device
///
/// A changed `ownerId` or `zoneId` must reference an existing record.
#[utoipa::path(
    put,
    path = "/api/devices/{device_id}",
    params(
        ("device_id" = Uuid, Path, description = "Device ID"),
    ),
    request_body = DevicePatch,
    responses(
        (status = 200, description = "Device updated", body = DeviceResponse),
        (status = 404, description = "Device not found"),
        (status = 422, description = "Owner or zone does not exist"),
    ),
    tag = "devices"
)]
pub async fn update_device(
    State(state): State<AppState>,
    ApiPath(device_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<DevicePatch>,
) -> AppResult<Json<DeviceResponse>> {
    let device = device_service::update(&state.db, device_id, patch).await?;
    Ok(Json(device.into()))
}

/// Delete a device
///
/// Refused while the device still lists mounted sensors.
#[utoipa::path(
    delete,
    path = "/api/devices/{device_id}",
    params(
        ("device_id" = Uuid, Path, description = "Device ID"),
    ),
    responses(
        (status = 200, description = "Device deleted", body = DeviceResponse),
        (status = 404, description = "Device not found"),
        (status = 409, description = "Sensors are still mounted on the device"),
    ),
    tag = "devices"
)]
pub async fn delete_device(
    State(state): State<AppState>,
    ApiPath(device_id): ApiPath<Uuid>,
) -> AppResult<Json<DeviceResponse>> {
    let device = device_service::delete(&state.db, device_id).await?;
    Ok(Json(device.into()))
}
