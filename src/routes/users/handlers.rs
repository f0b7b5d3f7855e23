use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::common::{ApiJson, ApiPath, AppState};
use crate::error::AppResult;
use crate::services::users::{self as user_service, NewUser, PublicUser, UserPatch};

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = Vec<PublicUser>),
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<PublicUser>>> {
    Ok(Json(user_service::list(&state.db).await?))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = PublicUser),
        (status = 404, description = "User not found"),
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(user_service::get(&state.db, user_id).await?))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = PublicUser),
        (status = 400, description = "Invalid user data"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let user = user_service::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    request_body = UserPatch,
    responses(
        (status = 200, description = "User updated", body = PublicUser),
        (status = 404, description = "User not found"),
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(user_service::update(&state.db, user_id, patch).await?))
}

/// Delete a user
///
/// Refused while the user owns devices.
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted", body = PublicUser),
        (status = 404, description = "User not found"),
        (status = 409, description = "The user still owns devices"),
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> AppResult<Json<PublicUser>> {
    Ok(Json(user_service::delete(&state.db, user_id).await?))
}
