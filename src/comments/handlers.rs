use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CommentBody, CommentResponse},
    repo_types::NewComment,
};
use crate::{
    auth::{policy::ensure_owner, services::required, AuthUser},
    error::AppError,
    extract::{AppJson, AppPath},
    state::AppState,
};

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/images/:image_id/comments",
            get(list_comments).post(add_comment),
        )
        .route(
            "/comments/:comment_id",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
}

#[instrument(skip(state, _caller))]
pub async fn list_comments(
    State(state): State<AppState>,
    _caller: AuthUser,
    AppPath(image_id): AppPath<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    if state.images.find_by_id(image_id).await?.is_none() {
        return Err(AppError::NotFound("Image"));
    }
    let rows = state.comments.list_by_image(image_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, _caller))]
pub async fn get_comment(
    State(state): State<AppState>,
    _caller: AuthUser,
    AppPath(comment_id): AppPath<Uuid>,
) -> Result<Json<CommentResponse>, AppError> {
    let row = state
        .comments
        .find_by_id(comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.id))]
pub async fn add_comment(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(image_id): AppPath<Uuid>,
    AppJson(payload): AppJson<CommentBody>,
) -> Result<(StatusCode, HeaderMap, Json<CommentResponse>), AppError> {
    let content = required("Content", &payload.content)?;
    if state.images.find_by_id(image_id).await?.is_none() {
        return Err(AppError::NotFound("Image"));
    }

    let row = state
        .comments
        .create(NewComment {
            user_id: caller.id,
            image_id,
            content,
        })
        .await?;
    info!(comment_id = %row.comment_id, image_id = %image_id, "comment added");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/comments/{}", row.comment_id).parse() {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(row.into())))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.id))]
pub async fn update_comment(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(comment_id): AppPath<Uuid>,
    AppJson(payload): AppJson<CommentBody>,
) -> Result<StatusCode, AppError> {
    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment"))?;
    ensure_owner(&caller, &comment)?;
    let content = required("Content", &payload.content)?;

    if !state.comments.update_content(comment_id, &content).await? {
        return Err(AppError::NotFound("Comment"));
    }
    info!(comment_id = %comment_id, "comment updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, caller), fields(caller = %caller.id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(comment_id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .ok_or(AppError::NotFound("Comment"))?;
    ensure_owner(&caller, &comment)?;

    if !state.comments.delete(comment_id).await? {
        return Err(AppError::NotFound("Comment"));
    }
    info!(comment_id = %comment_id, "comment deleted");
    Ok(StatusCode::NO_CONTENT)
}
