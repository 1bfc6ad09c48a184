use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{auth::AuthUser, error::AppError, extract::AppPath, state::AppState};

#[derive(Debug, Serialize)]
pub struct LikedResponse {
    pub liked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsLikedResponse {
    pub is_liked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeCountResponse {
    pub like_count: i64,
}

pub fn like_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/images/:image_id/like",
            get(is_liked).post(like_image).delete(unlike_image),
        )
        .route("/images/:image_id/likes", get(like_count))
}

#[instrument(skip(state, caller), fields(caller = %caller.id))]
pub async fn like_image(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(image_id): AppPath<Uuid>,
) -> Result<(StatusCode, Json<LikedResponse>), AppError> {
    if state.images.find_by_id(image_id).await?.is_none() {
        return Err(AppError::NotFound("Image"));
    }
    if !state.likes.like(caller.id, image_id).await? {
        warn!(image_id = %image_id, "image already liked");
        return Err(AppError::conflict("You have already liked this image."));
    }
    info!(image_id = %image_id, "image liked");
    Ok((StatusCode::CREATED, Json(LikedResponse { liked: true })))
}

#[instrument(skip(state, caller), fields(caller = %caller.id))]
pub async fn unlike_image(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(image_id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.likes.unlike(caller.id, image_id).await? {
        return Err(AppError::NotFound("Like"));
    }
    info!(image_id = %image_id, "image unliked");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, caller), fields(caller = %caller.id))]
pub async fn is_liked(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(image_id): AppPath<Uuid>,
) -> Result<Json<IsLikedResponse>, AppError> {
    let is_liked = state.likes.is_liked(caller.id, image_id).await?;
    Ok(Json(IsLikedResponse { is_liked }))
}

#[instrument(skip(state, _caller))]
pub async fn like_count(
    State(state): State<AppState>,
    _caller: AuthUser,
    AppPath(image_id): AppPath<Uuid>,
) -> Result<Json<LikeCountResponse>, AppError> {
    let like_count = state.likes.count(image_id).await?;
    Ok(Json(LikeCountResponse { like_count }))
}
