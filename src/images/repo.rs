use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{ImageRow, NewImage};

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn find_by_id(&self, image_id: Uuid) -> anyhow::Result<Option<ImageRow>>;
    /// Newest first.
    async fn list_page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<ImageRow>>;
    async fn count(&self) -> anyhow::Result<i64>;
    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ImageRow>>;
    async fn create(&self, new: NewImage) -> anyhow::Result<ImageRow>;
    async fn update_description(
        &self,
        image_id: Uuid,
        description: Option<String>,
    ) -> anyhow::Result<bool>;
    /// Comments and likes on the image go with it.
    async fn delete(&self, image_id: Uuid) -> anyhow::Result<bool>;
}

const IMAGE_SELECT: &str = r#"
    SELECT i.image_id, i.user_id, i.image_url, i.storage_key, i.description, i.created_at,
           u.name AS author_name, u.profile_picture AS author_profile_picture
      FROM images i
      JOIN users u ON u.user_id = i.user_id
"#;

#[derive(Clone)]
pub struct PgImageStore {
    db: PgPool,
}

impl PgImageStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ImageStore for PgImageStore {
    async fn find_by_id(&self, image_id: Uuid) -> anyhow::Result<Option<ImageRow>> {
        let row = sqlx::query_as::<_, ImageRow>(&format!("{IMAGE_SELECT} WHERE i.image_id = $1"))
            .bind(image_id)
            .fetch_optional(&self.db)
            .await
            .context("find image by id")?;
        Ok(row)
    }

    async fn list_page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<ImageRow>> {
        let rows = sqlx::query_as::<_, ImageRow>(&format!(
            "{IMAGE_SELECT} ORDER BY i.created_at DESC, i.image_id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list image page")?;
        Ok(rows)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images")
            .fetch_one(&self.db)
            .await
            .context("count images")?;
        Ok(total)
    }

    async fn list_by_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ImageRow>> {
        let rows = sqlx::query_as::<_, ImageRow>(&format!(
            "{IMAGE_SELECT} WHERE i.user_id = $1 ORDER BY i.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list images by user")?;
        Ok(rows)
    }

    async fn create(&self, new: NewImage) -> anyhow::Result<ImageRow> {
        let row = sqlx::query_as::<_, ImageRow>(
            r#"
            WITH inserted AS (
                INSERT INTO images (user_id, image_url, storage_key, description)
                VALUES ($1, $2, $3, $4)
                RETURNING image_id, user_id, image_url, storage_key, description, created_at
            )
            SELECT i.image_id, i.user_id, i.image_url, i.storage_key, i.description, i.created_at,
                   u.name AS author_name, u.profile_picture AS author_profile_picture
              FROM inserted i
              JOIN users u ON u.user_id = i.user_id
            "#,
        )
        .bind(new.user_id)
        .bind(&new.image_url)
        .bind(&new.storage_key)
        .bind(&new.description)
        .fetch_one(&self.db)
        .await
        .context("insert image")?;
        Ok(row)
    }

    async fn update_description(
        &self,
        image_id: Uuid,
        description: Option<String>,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE images SET description = $2 WHERE image_id = $1")
            .bind(image_id)
            .bind(description)
            .execute(&self.db)
            .await
            .context("update image description")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, image_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM images WHERE image_id = $1")
            .bind(image_id)
            .execute(&self.db)
            .await
            .context("delete image")?;
        Ok(res.rows_affected() > 0)
    }
}
