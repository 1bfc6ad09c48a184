use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{PgUserStore, UserStore},
    },
    comments::repo::{CommentStore, PgCommentStore},
    config::AppConfig,
    images::repo::{ImageStore, PgImageStore},
    likes::repo::{LikeStore, PgLikeStore},
    storage::{LocalStorage, StorageClient},
};

/// Everything a handler can reach. Cheap to clone; all fields are shared and read-only.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: Arc<JwtKeys>,
    pub users: Arc<dyn UserStore>,
    pub images: Arc<dyn ImageStore>,
    pub comments: Arc<dyn CommentStore>,
    pub likes: Arc<dyn LikeStore>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        run_migrations(&db).await?;

        let local = LocalStorage::new(&config.media.dir, &config.media.public_base_url).await?;
        info!(dir = %local.root().display(), "media storage ready");
        let storage = Arc::new(local) as Arc<dyn StorageClient>;

        Ok(Self {
            jwt: Arc::new(JwtKeys::from_config(&config.jwt)),
            users: Arc::new(PgUserStore::new(db.clone())),
            images: Arc::new(PgImageStore::new(db.clone())),
            comments: Arc::new(PgCommentStore::new(db.clone())),
            likes: Arc::new(PgLikeStore::new(db)),
            storage,
            config,
        })
    }
}

/// Applies `migrations/`. The service cannot run without its schema, so failure is fatal.
pub(crate) async fn run_migrations(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    info!("migrations applied");
    Ok(())
}
