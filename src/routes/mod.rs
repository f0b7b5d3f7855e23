pub mod devices;
pub mod health;
pub mod readings;
pub mod sensors;
pub mod users;
pub mod zones;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use crate::entity::{devices::DeviceStatus, sensors::SensorType, users::Role};
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        zones::list_zones,
        zones::get_zone,
        zones::create_zone,
        zones::update_zone,
        zones::delete_zone,
        devices::list_devices,
        devices::get_device,
        devices::create_device,
        devices::update_device,
        devices::delete_device,
        sensors::list_sensors,
        sensors::get_sensor,
        sensors::create_sensor,
        sensors::update_sensor,
        sensors::delete_sensor,
        readings::list_readings,
        readings::list_sensor_readings,
        readings::get_reading,
        readings::create_reading,
        readings::update_reading,
        readings::delete_reading,
    ),
    components(
        schemas(
            Role,
            DeviceStatus,
            SensorType,
            services::users::PublicUser,
            services::users::NewUser,
            services::users::UserPatch,
            services::zones::NewZone,
            services::zones::ZonePatch,
            services::devices::NewDevice,
            services::devices::DevicePatch,
            services::sensors::NewSensor,
            services::sensors::SensorPatch,
            services::readings::NewReading,
            services::readings::ReadingPatch,
            zones::ZoneResponse,
            devices::DeviceResponse,
            devices::DeviceDetailResponse,
            devices::OwnerSummary,
            devices::ZoneSummary,
            sensors::SensorResponse,
            readings::ReadingResponse,
            readings::ReadingDetailResponse,
            readings::SensorSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Fleet users and device owners"),
        (name = "zones", description = "Zones devices are assigned to"),
        (name = "devices", description = "IoT devices"),
        (name = "sensors", description = "Sensors mounted on devices"),
        (name = "readings", description = "Sensor readings"),
    ),
    info(
        title = "Fleet DB API",
        description = "IoT fleet metadata with referential-integrity guards",
        version = "0.1.0"
    )
)]
struct ApiDoc;

async fn banner() -> &'static str {
    "Fleet API is running"
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.request_body_limit_bytes;

    let api_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/zones", get(zones::list_zones).post(zones::create_zone))
        .route(
            "/zones/{zone_id}",
            get(zones::get_zone)
                .put(zones::update_zone)
                .delete(zones::delete_zone),
        )
        .route(
            "/devices",
            get(devices::list_devices).post(devices::create_device),
        )
        .route(
            "/devices/{device_id}",
            get(devices::get_device)
                .put(devices::update_device)
                .delete(devices::delete_device),
        )
        .route(
            "/sensors",
            get(sensors::list_sensors).post(sensors::create_sensor),
        )
        .route(
            "/sensors/{sensor_id}",
            get(sensors::get_sensor)
                .put(sensors::update_sensor)
                .delete(sensors::delete_sensor),
        )
        .route(
            "/readings",
            get(readings::list_readings).post(readings::create_reading),
        )
        .route(
            "/readings/sensor/{sensor_id}",
            get(readings::list_sensor_readings),
        )
        .route(
            "/readings/{reading_id}",
            get(readings::get_reading)
                .put(readings::update_reading)
                .delete(readings::delete_reading),
        )
        .layer(RequestBodyLimitLayer::new(body_limit));

    // Health check and banner
    let health_routes = Router::new()
        .route("/", get(banner))
        .route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
