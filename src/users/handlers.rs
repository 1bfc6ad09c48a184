use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{ChangePasswordRequest, UpdateUserRequest};
use crate::{
    auth::{
        dto::PublicUser,
        policy::ensure_self,
        repo_types::{ProfileUpdate, User},
        services::{self, normalize_email, optional, required},
        AuthUser,
    },
    error::AppError,
    extract::{AppJson, AppPath},
    images::services::discard_object,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/:user_id/password", put(change_password))
}

#[instrument(skip(state, _caller))]
pub async fn get_user(
    State(state): State<AppState>,
    _caller: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<PublicUser>, AppError> {
    let user = load_user(&state, user_id).await?;
    Ok(Json(user.into()))
}

/// Missing users answer 404 before any ownership check runs.
async fn load_user(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.id))]
pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<StatusCode, AppError> {
    load_user(&state, user_id).await?;
    ensure_self(&caller, user_id)?;

    let update = ProfileUpdate {
        name: required("Name", &payload.name)?,
        email: normalize_email(&payload.email)?,
        profile_picture: optional(payload.profile_picture),
        bio: optional(payload.bio),
    };

    if let Some(other) = state.users.find_by_email(&update.email).await? {
        if other.user_id != user_id {
            warn!(user_id = %user_id, "profile update to an email already in use");
            return Err(AppError::conflict("Email is already in use."));
        }
    }

    if !state.users.update_profile(user_id, update).await? {
        return Err(AppError::conflict("Email is already in use."));
    }

    info!(user_id = %user_id, "profile updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.id))]
pub async fn change_password(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    load_user(&state, user_id).await?;
    ensure_self(&caller, user_id)?;
    services::change_password(
        state.users.as_ref(),
        user_id,
        &payload.old_password,
        &payload.new_password,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, caller), fields(caller = %caller.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    load_user(&state, user_id).await?;
    ensure_self(&caller, user_id)?;
    let keys = state
        .users
        .delete(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    for key in &keys {
        discard_object(&state, key).await;
    }
    info!(user_id = %user_id, images = keys.len(), "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
