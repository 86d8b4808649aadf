//! # jot-db
//!
//! PostgreSQL persistence layer for the jot note lifecycle engine.
//!
//! This crate provides:
//! - Connection pool management
//! - The [`PgNoteStore`] implementation of `NoteStore`
//! - Version history with a capped, newest-first snapshot log
//! - Trash retention queries for the background sweeper
//!
//! ## Example
//!
//! ```rust,ignore
//! use jot_db::{CreateNoteRequest, Database, NoteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/jot").await?;
//!
//!     let note = db
//!         .notes
//!         .insert(
//!             "cookie-user",
//!             CreateNoteRequest {
//!                 title: "Groceries".to_string(),
//!                 content: "Buy milk".to_string(),
//!                 tags: Some(vec!["errands".to_string()]),
//!             },
//!         )
//!         .await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod notes;
pub mod pool;
mod quota;
mod trash;
mod versions;

#[cfg(test)]
mod tests;

// Always compiled so integration tests (in tests/) can use
// DEFAULT_TEST_DATABASE_URL.
pub mod test_fixtures;

// Re-export core types
pub use jot_core::*;

pub use notes::PgNoteStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Main database handle bundling the pool and the note store.
#[derive(Debug, Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note store for lifecycle operations.
    pub notes: PgNoteStore,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteStore::new(pool.clone()),
            pool,
        }
    }

    /// Connect with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Connect with custom pool configuration.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations from the workspace `migrations/` directory.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}
