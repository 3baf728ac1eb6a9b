pub mod migrations;
pub mod models;

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Shared database connection.
/// rusqlite is synchronous, so the connection lives behind a Mutex and
/// every query runs on the blocking pool via `Store::call`.
pub type DbPool = Arc<Mutex<Connection>>;

/// Current time as stored in `created_at` columns (RFC 3339, microseconds, UTC),
/// so lexical order matches chronological order.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("migration: {0}")]
    Migration(#[from] rusqlite_migration::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("database lock poisoned")]
    Poisoned,
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Handle to the users/posts store. Constructed once in `main` and handed to
/// the router state; cloning shares the same connection.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    /// Create the data directory if needed, open (or create) the database
    /// file, enable WAL and foreign keys, and run migrations.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("mini.db");
        let conn = Connection::open(&db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let store = Self::from_connection(conn)?;
        tracing::info!("Database initialized at {}", db_path.display());
        Ok(store)
    }

    /// In-memory store, used by unit tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::migrations().to_latest(&mut conn)?;
        Ok(Self {
            pool: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    pub async fn call<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.lock().map_err(|_| E::from(StoreError::Poisoned))?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| E::from(StoreError::Join(e)))?
    }

    /// Flush the WAL into the main database file. Called once on graceful exit.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        self.call(|conn| {
            conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
            Ok::<_, StoreError>(())
        })
        .await?;
        tracing::info!("Database closed");
        Ok(())
    }
}
