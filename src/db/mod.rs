use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::entities::{email_users, users};
use crate::hasher::{Argon2Hasher, Hasher};

pub mod migrator;
pub mod repositories;

pub use repositories::token::TokenRepository;
pub use repositories::user::UserRepository;

/// Owns the database connection and hands out configured repositories.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    hasher: Arc<dyn Hasher>,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1, Arc::new(Argon2Hasher::new())).await
    }

    /// Connects with pool sizes and Argon2 costs taken from `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::with_pool_options(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
            Arc::new(Argon2Hasher::with_config(config.security.clone())),
        )
        .await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
        hasher: Arc<dyn Hasher>,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn, hasher })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Repository over the username-identified variant.
    #[must_use]
    pub fn users(&self) -> UserRepository<users::Model> {
        UserRepository::new(self.conn.clone(), Arc::clone(&self.hasher), self.tokens())
    }

    /// Repository over the email-identified variant.
    #[must_use]
    pub fn email_users(&self) -> UserRepository<email_users::Model> {
        UserRepository::new(self.conn.clone(), Arc::clone(&self.hasher), self.tokens())
    }

    #[must_use]
    pub fn tokens(&self) -> TokenRepository {
        TokenRepository::new(self.conn.clone())
    }
}
