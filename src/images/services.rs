use anyhow::Context;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::{ImageRow, NewImage};
use crate::{error::AppError, state::AppState};

pub struct UploadItem<'a> {
    pub body: Bytes,
    pub content_type: &'a str,
}

pub(crate) fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// Stores the bytes under a server-chosen key and records the image for `owner`.
pub async fn upload_image(
    st: &AppState,
    owner: Uuid,
    item: UploadItem<'_>,
    description: Option<String>,
) -> Result<ImageRow, AppError> {
    if item.body.is_empty() {
        return Err(AppError::validation("No image file uploaded."));
    }
    let ext = ext_from_mime(item.content_type)
        .ok_or_else(|| AppError::validation("Unsupported image type"))?;

    let key = format!("{}.{}", Uuid::new_v4(), ext);
    st.storage
        .put_object(&key, item.body, item.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;

    let new = NewImage {
        user_id: owner,
        image_url: st.storage.public_url(&key),
        storage_key: key.clone(),
        description,
    };
    let row = match st.images.create(new).await {
        Ok(row) => row,
        Err(e) => {
            if let Err(cleanup) = st.storage.delete_object(&key).await {
                warn!(error = %cleanup, key = %key, "orphaned upload left behind");
            }
            return Err(e.into());
        }
    };

    info!(image_id = %row.image_id, user_id = %owner, "image uploaded");
    Ok(row)
}

/// Removes the stored file of a deleted image. Failures are logged, not returned.
pub async fn discard_object(st: &AppState, key: &str) {
    if let Err(e) = st.storage.delete_object(key).await {
        warn!(error = %e, key = %key, "failed to remove stored image");
    }
}
