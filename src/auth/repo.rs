use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewUser, ProfileUpdate, User};

/// Credential store: user records keyed by id and by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<User>>;
    /// Returns `None` when the email is already registered.
    async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>>;
    /// Returns `false` when the new email belongs to another user.
    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> anyhow::Result<bool>;
    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> anyhow::Result<()>;
    /// Deletes the user with their images, comments and likes. Returns the storage
    /// keys of every removed image, or `None` when there was no such user.
    async fn delete(&self, user_id: Uuid) -> anyhow::Result<Option<Vec<String>>>;
}

const USER_COLUMNS: &str = "user_id, name, email, password_hash, profile_picture, bio, created_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, user_id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<Option<User>> {
        let res = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, profile_picture, bio)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.profile_picture)
        .bind(&new.bio)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(user) => Ok(Some(user)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("insert user")),
        }
    }

    async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET name = $2, email = $3, profile_picture = $4, bio = $5
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(&update.profile_picture)
        .bind(&update.bio)
        .execute(&self.db)
        .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("update user profile")),
        }
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.db)
            .await
            .context("update password hash")?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> anyhow::Result<Option<Vec<String>>> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        // the row lock makes concurrent image inserts for this user wait, then fail their FK check
        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM users WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .context("lock user")?;
        if exists.is_none() {
            return Ok(None);
        }

        let keys: Vec<String> =
            sqlx::query_scalar("DELETE FROM images WHERE user_id = $1 RETURNING storage_key")
                .bind(user_id)
                .fetch_all(&mut *tx)
                .await
                .context("delete user images")?;

        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("delete user")?;

        tx.commit().await.context("commit tx")?;
        Ok(Some(keys))
    }
}
