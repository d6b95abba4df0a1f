use crate::config::FeedConfig;
use crate::infrastructure::db::{create_connection, run_migrations, SeaOrmRepository};
use crate::infrastructure::memory::MemoryRepository;
use crate::infrastructure::Backend;
use reddit_errors::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub backend: Backend,
    pub config: FeedConfig,
}

impl AppContext {
    pub async fn new_database(database_url: &str, config: FeedConfig) -> Result<Self, AppError> {
        let db = create_connection(database_url)
            .await
            .map_err(|e| AppError::Internal(format!("database connection failed: {}", e)))?;
        run_migrations(&db)
            .await
            .map_err(|e| AppError::Internal(format!("migrations failed: {}", e)))?;

        Ok(Self {
            backend: Backend::Database(SeaOrmRepository::new(db)),
            config,
        })
    }

    pub fn new_memory(config: FeedConfig) -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryRepository::seeded())),
            config,
        }
    }

    pub async fn from_env() -> Result<Self, AppError> {
        let config = FeedConfig::from_env();

        match std::env::var("DATABASE_URL") {
            Ok(url) => {
                tracing::info!("Using Postgres backend");
                Self::new_database(&url, config).await
            }
            Err(_) => {
                tracing::warn!("DATABASE_URL not set, serving seeded in-memory data");
                Ok(Self::new_memory(config))
            }
        }
    }
}
