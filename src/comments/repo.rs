use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{CommentRow, NewComment};

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn find_by_id(&self, comment_id: Uuid) -> anyhow::Result<Option<CommentRow>>;
    /// Newest first.
    async fn list_by_image(&self, image_id: Uuid) -> anyhow::Result<Vec<CommentRow>>;
    async fn create(&self, new: NewComment) -> anyhow::Result<CommentRow>;
    async fn update_content(&self, comment_id: Uuid, content: &str) -> anyhow::Result<bool>;
    async fn delete(&self, comment_id: Uuid) -> anyhow::Result<bool>;
}

const COMMENT_SELECT: &str = r#"
    SELECT c.comment_id, c.user_id, c.image_id, c.content, c.created_at,
           u.name AS author_name, u.profile_picture AS author_profile_picture
      FROM comments c
      JOIN users u ON u.user_id = c.user_id
"#;

#[derive(Clone)]
pub struct PgCommentStore {
    db: PgPool,
}

impl PgCommentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn find_by_id(&self, comment_id: Uuid) -> anyhow::Result<Option<CommentRow>> {
        let row =
            sqlx::query_as::<_, CommentRow>(&format!("{COMMENT_SELECT} WHERE c.comment_id = $1"))
                .bind(comment_id)
                .fetch_optional(&self.db)
                .await
                .context("find comment by id")?;
        Ok(row)
    }

    async fn list_by_image(&self, image_id: Uuid) -> anyhow::Result<Vec<CommentRow>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "{COMMENT_SELECT} WHERE c.image_id = $1 ORDER BY c.created_at DESC"
        ))
        .bind(image_id)
        .fetch_all(&self.db)
        .await
        .context("list comments by image")?;
        Ok(rows)
    }

    async fn create(&self, new: NewComment) -> anyhow::Result<CommentRow> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (user_id, image_id, content)
                VALUES ($1, $2, $3)
                RETURNING comment_id, user_id, image_id, content, created_at
            )
            SELECT c.comment_id, c.user_id, c.image_id, c.content, c.created_at,
                   u.name AS author_name, u.profile_picture AS author_profile_picture
              FROM inserted c
              JOIN users u ON u.user_id = c.user_id
            "#,
        )
        .bind(new.user_id)
        .bind(new.image_id)
        .bind(&new.content)
        .fetch_one(&self.db)
        .await
        .context("insert comment")?;
        Ok(row)
    }

    async fn update_content(&self, comment_id: Uuid, content: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE comments SET content = $2 WHERE comment_id = $1")
            .bind(comment_id)
            .bind(content)
            .execute(&self.db)
            .await
            .context("update comment")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, comment_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM comments WHERE comment_id = $1")
            .bind(comment_id)
            .execute(&self.db)
            .await
            .context("delete comment")?;
        Ok(res.rows_affected() > 0)
    }
}
