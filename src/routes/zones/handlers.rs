use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::common::{ApiJson, ApiPath, AppState};
use crate::error::AppResult;
use crate::services::zones::{self as zone_service, NewZone, ZonePatch};

use super::types::ZoneResponse;

/// List all zones
#[utoipa::path(
    get,
    path = "/api/zones",
    responses(
        (status = 200, description = "Zones retrieved successfully", body = Vec<ZoneResponse>),
    ),
    tag = "zones"
)]
pub async fn list_zones(State(state): State<AppState>) -> AppResult<Json<Vec<ZoneResponse>>> {
    let zones_list = zone_service::list(&state.db).await?;
    Ok(Json(zones_list.into_iter().map(ZoneResponse::from).collect()))
}

/// Get a specific zone by ID
#[utoipa::path(
    get,
    path = "/api/zones/{zone_id}",
    params(
        ("zone_id" = Uuid, Path, description = "Zone ID"),
    ),
    responses(
        (status = 200, description = "Zone retrieved successfully", body = ZoneResponse),
        (status = 404, description = "Zone not found"),
    ),
    tag = "zones"
)]
pub async fn get_zone(
    State(state): State<AppState>,
    ApiPath(zone_id): ApiPath<Uuid>,
) -> AppResult<Json<ZoneResponse>> {
    let zone = zone_service::get(&state.db, zone_id).await?;
    Ok(Json(zone.into()))
}

/// Create a zone
#[utoipa::path(
    post,
    path = "/api/zones",
    request_body = NewZone,
    responses(
        (status = 201, description = "Zone created", body = ZoneResponse),
        (status = 400, description = "Invalid zone data"),
    ),
    tag = "zones"
)]
pub async fn create_zone(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewZone>,
) -> AppResult<(StatusCode, Json<ZoneResponse>)> {
    let zone = zone_service::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(zone.into())))
}

/// Update a zone
#[utoipa::path(
    put,
    path = "/api/zones/{zone_id}",
    params(
        ("zone_id" = Uuid, Path, description = "Zone ID"),
    ),
    request_body = ZonePatch,
    responses(
        (status = 200, description = "Zone updated", body = ZoneResponse),
        (status = 404, description = "Zone not found"),
    ),
    tag = "zones"
)]
pub async fn update_zone(
    State(state): State<AppState>,
    ApiPath(zone_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ZonePatch>,
) -> AppResult<Json<ZoneResponse>> {
    let zone = zone_service::update(&state.db, zone_id, patch).await?;
    Ok(Json(zone.into()))
}

/// Delete a zone
///
/// Refused while any device is assigned to the zone.
#[utoipa::path(
    delete,
    path = "/api/zones/{zone_id}",
    params(
        ("zone_id" = Uuid, Path, description = "Zone ID"),
    ),
    responses(
        (status = 200, description = "Zone deleted", body = ZoneResponse),
        (status = 404, description = "Zone not found"),
        (status = 409, description = "Devices are still assigned to the zone"),
    ),
    tag = "zones"
)]
pub async fn delete_zone(
    State(state): State<AppState>,
    ApiPath(zone_id): ApiPath<Uuid>,
) -> AppResult<Json<ZoneResponse>> {
    let zone = zone_service::delete(&state.db, zone_id).await?;
    Ok(Json(zone.into()))
}
