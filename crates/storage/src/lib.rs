pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use error::{Result, StorageError};
pub use repository::PgClubStore;
pub use store::{ClubStore, MemoryStore};

/// Connection pool plus the embedded schema migrations.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn club_store(&self) -> PgClubStore {
        PgClubStore::new(self.pool.clone())
    }
}
