use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::CommentRow;
use crate::images::dto::Author;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub comment_id: Uuid,
    pub image_id: Uuid,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user: Author,
}

impl From<CommentRow> for CommentResponse {
    fn from(r: CommentRow) -> Self {
        Self {
            comment_id: r.comment_id,
            image_id: r.image_id,
            content: r.content,
            created_at: r.created_at,
            user: Author {
                user_id: r.user_id,
                name: r.author_name,
                profile_picture: r.author_profile_picture,
            },
        }
    }
}

/// Body for both creating and editing a comment.
#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub content: String,
}
