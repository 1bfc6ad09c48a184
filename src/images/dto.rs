use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::ImageRow;

/// Poster of an image or a comment, as embedded in responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub user_id: Uuid,
    pub name: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub image_id: Uuid,
    pub image_url: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user: Author,
}

impl From<ImageRow> for ImageResponse {
    fn from(r: ImageRow) -> Self {
        Self {
            image_id: r.image_id,
            image_url: r.image_url,
            description: r.description,
            created_at: r.created_at,
            user: Author {
                user_id: r.user_id,
                name: r.author_name,
                profile_picture: r.author_profile_picture,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateImageRequest {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

pub const MAX_PAGE_SIZE: i64 = 100;

impl Pagination {
    /// `(limit, offset)` for a 1-based page, or `None` when out of range.
    pub fn limit_offset(&self) -> Option<(i64, i64)> {
        if self.page < 1 || self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return None;
        }
        let offset = (self.page - 1).checked_mul(self.page_size)?;
        Some((self.page_size, offset))
    }
}
