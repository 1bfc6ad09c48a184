use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::policy::Owned;

/// Comment joined with its author's display fields.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub image_id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub author_name: String,
    pub author_profile_picture: Option<String>,
}

impl Owned for CommentRow {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: Uuid,
    pub image_id: Uuid,
    pub content: String,
}
