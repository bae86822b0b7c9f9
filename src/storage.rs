//! Local persistence for itineraries.
//!
//! Every itinerary lives in a single SQLite database:
//!
//! ```text
//! ~/.journee/journee.sqlite
//!   itinerary(id, title, destination, created_at, updated_at, body)
//! ```
//!
//! `body` holds the full itinerary as JSON; the other columns exist for
//! listing without decoding every body.

mod itinerary;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use std::{fs, io};

use async_trait::async_trait;
use rusqlite::Connection;
use uuid::Uuid;

use crate::autosave::{Persist, PersistError};
use crate::model::Snapshot;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("itinerary not found: {0}")]
    ItineraryNotFound(Uuid),

    #[error("corrupt itinerary record: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS itinerary (
        id          TEXT PRIMARY KEY,
        title       TEXT NOT NULL,
        destination TEXT,
        created_at  INTEGER NOT NULL,
        updated_at  INTEGER NOT NULL,
        body        TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS itinerary_updated_at ON itinerary (updated_at);
";

/// SQLite-backed itinerary store.
///
/// Cheap to clone: each operation opens its own connection.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Opens (creating if needed) the database at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let storage = Self { path };
        storage.connect()?.execute_batch(SCHEMA)?;
        Ok(storage)
    }

    /// Returns the default database path: `~/.journee/journee.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".journee").join("journee.sqlite"))
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        // Autosave writes from a blocking task may overlap a CLI read.
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }
}

#[async_trait]
impl Persist<Snapshot> for Storage {
    async fn persist(&self, document: &Snapshot) -> core::result::Result<(), PersistError> {
        let storage = self.clone();
        let itinerary = Arc::clone(document);
        tokio::task::spawn_blocking(move || storage.save_itinerary(&itinerary))
            .await
            .map_err(|e| PersistError::Task(e.to_string()))?
            .map_err(persist_error)
    }
}

/// Separates a store that cannot currently be reached (locked by another
/// writer, or not openable) from a failed write.
fn persist_error(err: StorageError) -> PersistError {
    use rusqlite::ErrorCode::{CannotOpen, DatabaseBusy, DatabaseLocked};

    match err {
        StorageError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
            if matches!(e.code, DatabaseBusy | DatabaseLocked | CannotOpen) =>
        {
            PersistError::Unavailable(e.to_string())
        }
        other => PersistError::Storage(other),
    }
}
