use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::common::{ApiJson, ApiPath, ApiQuery, AppState};
use crate::error::AppResult;
use crate::services::sensors::{self as sensor_service, NewSensor, SensorFilter, SensorPatch};

use super::types::SensorResponse;

/// List all sensors
#[utoipa::path(
    get,
    path = "/api/sensors",
    params(SensorFilter),
    responses(
        (status = 200, description = "Sensors retrieved successfully", body = Vec<SensorResponse>),
    ),
    tag = "sensors"
)]
pub async fn list_sensors(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<SensorFilter>,
) -> AppResult<Json<Vec<SensorResponse>>> {
    let sensors_list = sensor_service::list(&state.db, filter).await?;
    Ok(Json(
        sensors_list.into_iter().map(SensorResponse::from).collect(),
    ))
}

/// Get a specific sensor by ID
#[utoipa::path(
    get,
    path = "/api/sensors/{sensor_id}",
    params(
        ("sensor_id" = Uuid, Path, description = "Sensor ID"),
    ),
    responses(
        (status = 200, description = "Sensor retrieved successfully", body = SensorResponse),
        (status = 404, description = "Sensor not found"),
    ),
    tag = "sensors"
)]
pub async fn get_sensor(
    State(state): State<AppState>,
    ApiPath(sensor_id): ApiPath<Uuid>,
) -> AppResult<Json<SensorResponse>> {
    let sensor = sensor_service::get(&state.db, sensor_id).await?;
    Ok(Json(sensor.into()))
}

/// Register a sensor
#[utoipa::path(
    post,
    path = "/api/sensors",
    request_body = NewSensor,
    responses(
        (status = 201, description = "Sensor created", body = SensorResponse),
        (status = 400, description = "Invalid sensor data"),
    ),
    tag = "sensors"
)]
pub async fn create_sensor(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewSensor>,
) -> AppResult<(StatusCode, Json<SensorResponse>)> {
    let sensor = sensor_service::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(sensor.into())))
}

/// Update a sensor
#[utoipa::path(
    put,
    path = "/api/sensors/{sensor_id}",
    params(
        ("sensor_id" = Uuid, Path, description = "Sensor ID"),
    ),
    request_body = SensorPatch,
    responses(
        (status = 200, description = "Sensor updated", body = SensorResponse),
        (status = 404, description = "Sensor not found"),
    ),
    tag = "sensors"
)]
pub async fn update_sensor(
    State(state): State<AppState>,
    ApiPath(sensor_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<SensorPatch>,
) -> AppResult<Json<SensorResponse>> {
    let sensor = sensor_service::update(&state.db, sensor_id, patch).await?;
    Ok(Json(sensor.into()))
}

/// Delete a sensor
///
/// Refused while readings recorded by the sensor exist.
#[utoipa::path(
    delete,
    path = "/api/sensors/{sensor_id}",
    params(
        ("sensor_id" = Uuid, Path, description = "Sensor ID"),
    ),
    responses(
        (status = 200, description = "Sensor deleted", body = SensorResponse),
        (status = 404, description = "Sensor not found"),
        (status = 409, description = "The sensor still has readings"),
    ),
    tag = "sensors"
)]
pub async fn delete_sensor(
    State(state): State<AppState>,
    ApiPath(sensor_id): ApiPath<Uuid>,
) -> AppResult<Json<SensorResponse>> {
    let sensor = sensor_service::delete(&state.db, sensor_id).await?;
    Ok(Json(sensor.into()))
}
