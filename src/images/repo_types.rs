use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::policy::Owned;

/// Image joined with the name and avatar of the user who posted it.
#[derive(Debug, Clone, FromRow)]
pub struct ImageRow {
    pub image_id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub storage_key: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub author_name: String,
    pub author_profile_picture: Option<String>,
}

impl Owned for ImageRow {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub user_id: Uuid,
    pub image_url: String,
    pub storage_key: String,
    pub description: Option<String>,
}
