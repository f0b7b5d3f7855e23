//! Users. The password is write-only: it is hashed on the way in and every
//! result leaves through [`PublicUser`], which has no field for it.

use std::sync::LazyLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{check_new, check_patch, delete_guarded, find_existing, require_text};
use crate::entity::users::{self, Role};
use crate::entity::EntityKind;
use crate::error::{AppError, AppResult};
use crate::integrity::Record;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+@.+\..+").expect("email pattern is valid"));

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Read projection of a user, never carrying the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for PublicUser {
    fn from(u: users::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

impl Record for NewUser {
    const KIND: EntityKind = EntityKind::User;
}

impl Record for UserPatch {
    const KIND: EntityKind = EntityKind::User;
}

impl Record for users::Model {
    const KIND: EntityKind = EntityKind::User;
}

fn validate_email(email: &str) -> AppResult<()> {
    if EMAIL_PATTERN.is_match(email) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "`email` is not a valid address: '{email}'"
        )))
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    require_text("password", password)?;
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

pub async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<PublicUser>> {
    let users_list = users::Entity::find()
        .order_by_asc(users::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(users_list.into_iter().map(PublicUser::from).collect())
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<PublicUser> {
    find_existing::<users::Entity, _>(db, id)
        .await
        .map(PublicUser::from)
}

pub async fn create<C: ConnectionTrait>(db: &C, input: NewUser) -> AppResult<PublicUser> {
    require_text("name", &input.name)?;
    validate_email(&input.email)?;
    check_new(db, &input).await?;

    let user = users::ActiveModel {
        name: Set(input.name),
        email: Set(input.email),
        password_hash: Set(hash_password(&input.password)?),
        role: Set(input.role),
        ..users::ActiveModel::new()
    }
    .insert(db)
    .await?;

    tracing::info!(id = %user.id, role = ?user.role, "User created");
    Ok(user.into())
}

pub async fn update<C: ConnectionTrait>(db: &C, id: Uuid, patch: UserPatch) -> AppResult<PublicUser> {
    let existing = find_existing::<users::Entity, _>(db, id).await?;
    check_patch(db, &patch).await?;

    let mut user: users::ActiveModel = existing.into();
    if let Some(name) = patch.name {
        require_text("name", &name)?;
        user.name = Set(name);
    }
    if let Some(email) = patch.email {
        validate_email(&email)?;
        user.email = Set(email);
    }
    if let Some(password) = patch.password {
        user.password_hash = Set(hash_password(&password)?);
    }
    if let Some(role) = patch.role {
        user.role = Set(role);
    }
    user.updated_at = Set(Utc::now());

    let user = user.update(db).await?;
    tracing::debug!(%id, "User updated");
    Ok(user.into())
}

pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<PublicUser> {
    let user = find_existing::<users::Entity, _>(db, id).await?;
    delete_guarded::<users::Entity, _>(db, id, &user).await?;
    Ok(user.into())
}
