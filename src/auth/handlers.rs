use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::hash_password,
        repo_types::NewUser,
        services::{self, normalize_email, optional, required, validate_new_password},
    },
    error::AppError,
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let name = required("Name", &payload.name)?;
    let email = normalize_email(&payload.email)?;
    validate_new_password(&payload.password)?;

    let password_hash = hash_password(&payload.password)?;
    let user = services::register_user(
        state.users.as_ref(),
        NewUser {
            name,
            email,
            password_hash,
            profile_picture: optional(payload.profile_picture),
            bio: optional(payload.bio),
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.user_id,
            name: user.name,
        }),
    ))
}

#[instrument(skip(state, keys, payload))]
pub async fn login(
    State(state): State<AppState>,
    State(keys): State<Arc<JwtKeys>>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let user = services::authenticate(state.users.as_ref(), email, &payload.password).await?;
    let token = keys.sign(user.user_id, &user.email)?;

    info!(user_id = %user.user_id, "user logged in");
    Ok(Json(LoginResponse { token }))
}

#[instrument(skip(state, user), fields(user_id = %user.id, email = %user.email))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let record = state
        .users
        .find_by_id(user.id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(record.into()))
}
