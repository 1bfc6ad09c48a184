use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{ImageResponse, Pagination, UpdateImageRequest},
    services::{discard_object, upload_image, UploadItem},
};
use crate::{
    auth::{policy::ensure_owner, services::optional, AuthUser},
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    state::AppState,
};

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024; // 20MB

pub fn image_routes() -> Router<AppState> {
    Router::new()
        .route("/images", get(list_images).post(create_image))
        .route(
            "/images/:image_id",
            get(get_image).put(update_image).delete(delete_image),
        )
        .route("/users/:user_id/images", get(list_user_images))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Total number of images, sent with every feed page.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Feed, newest first. A page past the end answers 204.
#[instrument(skip(state, _caller))]
pub async fn list_images(
    State(state): State<AppState>,
    _caller: AuthUser,
    AppQuery(p): AppQuery<Pagination>,
) -> Result<Response, AppError> {
    let (limit, offset) = p
        .limit_offset()
        .ok_or_else(|| AppError::validation("Invalid page or pageSize"))?;
    let total = state.images.count().await?;
    let total_header = [(TOTAL_COUNT_HEADER, total.to_string())];
    if offset >= total {
        return Ok((StatusCode::NO_CONTENT, total_header).into_response());
    }

    let rows = state.images.list_page(limit, offset).await?;
    if rows.is_empty() {
        return Ok((StatusCode::NO_CONTENT, total_header).into_response());
    }
    let items: Vec<ImageResponse> = rows.into_iter().map(Into::into).collect();
    Ok((total_header, Json(items)).into_response())
}

#[instrument(skip(state, _caller))]
pub async fn list_user_images(
    State(state): State<AppState>,
    _caller: AuthUser,
    AppPath(user_id): AppPath<Uuid>,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    if state.users.find_by_id(user_id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }
    let rows = state.images.list_by_user(user_id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, _caller))]
pub async fn get_image(
    State(state): State<AppState>,
    _caller: AuthUser,
    AppPath(image_id): AppPath<Uuid>,
) -> Result<Json<ImageResponse>, AppError> {
    let row = state
        .images
        .find_by_id(image_id)
        .await?
        .ok_or(AppError::NotFound("Image"))?;
    Ok(Json(row.into()))
}

/// POST /images (multipart): `image` file part, optional `description` text part.
#[instrument(skip(state, caller, mp), fields(caller = %caller.id))]
pub async fn create_image(
    State(state): State<AppState>,
    caller: AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, HeaderMap, Json<ImageResponse>), AppError> {
    let mut mp = mp?;
    let mut file: Option<(Bytes, String)> = None;
    let mut description: Option<String> = None;

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") | Some("imageFile") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Unreadable image part: {e}")))?;
                file = Some((data, content_type));
            }
            Some("description") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Unreadable description: {e}")))?;
                description = optional(Some(text));
            }
            _ => {}
        }
    }

    let (body, content_type) =
        file.ok_or_else(|| AppError::validation("No image file uploaded."))?;
    let row = upload_image(
        &state,
        caller.id,
        UploadItem {
            body,
            content_type: &content_type,
        },
        description,
    )
    .await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/images/{}", row.image_id).parse() {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(row.into())))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.id))]
pub async fn update_image(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(image_id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateImageRequest>,
) -> Result<StatusCode, AppError> {
    let image = state
        .images
        .find_by_id(image_id)
        .await?
        .ok_or(AppError::NotFound("Image"))?;
    ensure_owner(&caller, &image)?;

    if !state
        .images
        .update_description(image_id, optional(payload.description))
        .await?
    {
        return Err(AppError::NotFound("Image"));
    }
    info!(image_id = %image_id, "image updated");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, caller), fields(caller = %caller.id))]
pub async fn delete_image(
    State(state): State<AppState>,
    caller: AuthUser,
    AppPath(image_id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let image = state
        .images
        .find_by_id(image_id)
        .await?
        .ok_or(AppError::NotFound("Image"))?;
    ensure_owner(&caller, &image)?;

    if !state.images.delete(image_id).await? {
        return Err(AppError::NotFound("Image"));
    }
    discard_object(&state, &image.storage_key).await;
    info!(image_id = %image_id, "image deleted");
    Ok(StatusCode::NO_CONTENT)
}
