use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::common::{ApiJson, ApiPath, ApiQuery, AppState};
use crate::error::AppResult;
use crate::services::readings::{self as reading_service, NewReading, ReadingPatch, TimeRange};

use super::types::{ReadingDetailResponse, ReadingResponse};

fn to_responses(list: Vec<crate::entity::readings::Model>) -> Vec<ReadingResponse> {
    list.into_iter().map(ReadingResponse::from).collect()
}

/// List all readings, most recent first, each with its sensor
#[utoipa::path(
    get,
    path = "/api/readings",
    responses(
        (status = 200, description = "Readings retrieved successfully", body = Vec<ReadingDetailResponse>),
    ),
    tag = "readings"
)]
pub async fn list_readings(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ReadingDetailResponse>>> {
    let readings_list = reading_service::list_with_sensor(&state.db).await?;
    Ok(Json(
        readings_list.into_iter().map(ReadingDetailResponse::from).collect(),
    ))
}

/// Get the history of one sensor, most recent first
#[utoipa::path(
    get,
    path = "/api/readings/sensor/{sensor_id}",
    params(
        ("sensor_id" = Uuid, Path, description = "Sensor ID"),
        TimeRange
    ),
    responses(
        (status = 200, description = "Readings retrieved successfully", body = Vec<ReadingResponse>),
        (status = 400, description = "Invalid time range"),
    ),
    tag = "readings"
)]
pub async fn list_sensor_readings(
    State(state): State<AppState>,
    ApiPath(sensor_id): ApiPath<Uuid>,
    ApiQuery(range): ApiQuery<TimeRange>,
) -> AppResult<Json<Vec<ReadingResponse>>> {
    let readings_list = reading_service::list_by_sensor(&state.db, sensor_id, range).await?;
    Ok(Json(to_responses(readings_list)))
}

/// Get a specific reading by ID, with its sensor
#[utoipa::path(
    get,
    path = "/api/readings/{reading_id}",
    params(
        ("reading_id" = Uuid, Path, description = "Reading ID"),
    ),
    responses(
        (status = 200, description = "Reading retrieved successfully", body = ReadingDetailResponse),
        (status = 404, description = "Reading not found"),
    ),
    tag = "readings"
)]
pub async fn get_reading(
    State(state): State<AppState>,
    ApiPath(reading_id): ApiPath<Uuid>,
) -> AppResult<Json<ReadingDetailResponse>> {
    let reading = reading_service::get_with_sensor(&state.db, reading_id).await?;
    Ok(Json(reading.into()))
}

/// Record a reading
///
/// `sensorId` must reference an existing sensor.
#[utoipa::path(
    post,
    path = "/api/readings",
    request_body = NewReading,
    responses(
        (status = 201, description = "Reading stored", body = ReadingResponse),
        (status = 422, description = "Sensor does not exist"),
    ),
    tag = "readings"
)]
pub async fn create_reading(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewReading>,
) -> AppResult<(StatusCode, Json<ReadingResponse>)> {
    let reading = reading_service::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(reading.into())))
}

/// Update a reading
#[utoipa::path(
    put,
    path = "/api/readings/{reading_id}",
    params(
        ("reading_id" = Uuid, Path, description = "Reading ID"),
    ),
    request_body = ReadingPatch,
    responses(
        (status = 200, description = "Reading updated", body = ReadingResponse),
        (status = 404, description = "Reading not found"),
        (status = 422, description = "Sensor does not exist"),
    ),
    tag = "readings"
)]
pub async fn update_reading(
    State(state): State<AppState>,
    ApiPath(reading_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ReadingPatch>,
) -> AppResult<Json<ReadingResponse>> {
    let reading = reading_service::update(&state.db, reading_id, patch).await?;
    Ok(Json(reading.into()))
}

/// Delete a reading
#[utoipa::path(
    delete,
    path = "/api/readings/{reading_id}",
    params(
        ("reading_id" = Uuid, Path, description = "Reading ID"),
    ),
    responses(
        (status = 200, description = "Reading deleted", body = ReadingResponse),
        (status = 404, description = "Reading not found"),
    ),
    tag = "readings"
)]
pub async fn delete_reading(
    State(state): State<AppState>,
    ApiPath(reading_id): ApiPath<Uuid>,
) -> AppResult<Json<ReadingResponse>> {
    let reading = reading_service::delete(&state.db, reading_id).await?;
    Ok(Json(reading.into()))
}
