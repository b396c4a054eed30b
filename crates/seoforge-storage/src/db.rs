//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access.
//! Configures WAL mode and recommended PRAGMAs on initialization, then runs
//! the schema bootstrap once.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{info, warn};

use seoforge_core::error::SeoforgeError;

use crate::migrations;

/// Thread-safe SQLite database wrapper.
pub struct Database {
    conn: Mutex<Connection>,
    schema_ready: AtomicBool,
}

impl Database {
    /// Open (or create) a database at the given path.
    ///
    /// Failing to open the file or set pragmas is an error. A failed schema
    /// bootstrap is not: it is logged and reported by [`Database::schema_ready`].
    pub fn new(path: &Path) -> Result<Self, SeoforgeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| SeoforgeError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| SeoforgeError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());

        let db = Self::from_connection(conn);
        db.bootstrap_schema();
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, SeoforgeError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SeoforgeError::Storage(format!("Failed to open in-memory db: {}", e)))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| SeoforgeError::Storage(format!("Failed to set pragmas: {}", e)))?;

        let db = Self::from_connection(conn);
        db.bootstrap_schema();
        Ok(db)
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            schema_ready: AtomicBool::new(false),
        }
    }

    /// Create any missing tables. Safe to call repeatedly.
    ///
    /// Returns whether the schema is now in place.
    pub fn bootstrap_schema(&self) -> bool {
        let ready = match self.with_conn(migrations::run_migrations) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Schema bootstrap failed; reads will degrade to empty results");
                false
            }
        };
        self.schema_ready.store(ready, Ordering::Relaxed);
        ready
    }

    /// Whether the last schema bootstrap succeeded.
    pub fn schema_ready(&self) -> bool {
        self.schema_ready.load(Ordering::Relaxed)
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// The mutex is held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, SeoforgeError>
    where
        F: FnOnce(&Connection) -> Result<T, SeoforgeError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SeoforgeError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("schema_ready", &self.schema_ready())
            .finish()
    }
}
