use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Likes are `(user, image)` pairs; a pair exists at most once.
#[async_trait]
pub trait LikeStore: Send + Sync {
    /// Returns `false` when the pair already exists.
    async fn like(&self, user_id: Uuid, image_id: Uuid) -> anyhow::Result<bool>;
    /// Returns `false` when there was nothing to remove.
    async fn unlike(&self, user_id: Uuid, image_id: Uuid) -> anyhow::Result<bool>;
    async fn is_liked(&self, user_id: Uuid, image_id: Uuid) -> anyhow::Result<bool>;
    async fn count(&self, image_id: Uuid) -> anyhow::Result<i64>;
}

#[derive(Clone)]
pub struct PgLikeStore {
    db: PgPool,
}

impl PgLikeStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LikeStore for PgLikeStore {
    async fn like(&self, user_id: Uuid, image_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO likes (user_id, image_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, image_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(image_id)
        .execute(&self.db)
        .await
        .context("insert like")?;
        Ok(res.rows_affected() == 1)
    }

    async fn unlike(&self, user_id: Uuid, image_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND image_id = $2")
            .bind(user_id)
            .bind(image_id)
            .execute(&self.db)
            .await
            .context("delete like")?;
        Ok(res.rows_affected() > 0)
    }

    async fn is_liked(&self, user_id: Uuid, image_id: Uuid) -> anyhow::Result<bool> {
        let liked: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM likes WHERE user_id = $1 AND image_id = $2)",
        )
        .bind(user_id)
        .bind(image_id)
        .fetch_one(&self.db)
        .await
        .context("check like")?;
        Ok(liked)
    }

    async fn count(&self, image_id: Uuid) -> anyhow::Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE image_id = $1")
            .bind(image_id)
            .fetch_one(&self.db)
            .await
            .context("count likes")?;
        Ok(n)
    }
}
