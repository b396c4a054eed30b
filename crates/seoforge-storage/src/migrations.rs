//! Database schema migrations.
//!
//! Creates the generations, saved_results and training_examples tables plus
//! the schema_migrations bookkeeping table. All statements of a version run
//! inside one transaction so a partial schema is never left behind.

use rusqlite::Connection;
use tracing::info;

use seoforge_core::error::SeoforgeError;

/// Latest schema version this build knows how to create.
pub const SCHEMA_VERSION: i64 = 1;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), SeoforgeError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| SeoforgeError::Storage(format!("Failed to begin migration: {}", e)))?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| SeoforgeError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = tx
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| SeoforgeError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(&tx)?;
        info!("Applied migration v1: initial_schema");
    }

    tx.commit()
        .map_err(|e| SeoforgeError::Storage(format!("Failed to commit migration: {}", e)))?;

    Ok(())
}

/// Version 1: the three content tables.
fn apply_v1(conn: &Connection) -> Result<(), SeoforgeError> {
    conn.execute_batch(
        "
        -- AI drafts. title_options is a JSON array of exactly five strings.
        CREATE TABLE IF NOT EXISTS generations (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            transcript      TEXT NOT NULL,
            description     TEXT NOT NULL,
            thumbnail_title TEXT NOT NULL,
            video_title     TEXT NOT NULL,
            tags            TEXT NOT NULL,
            title_options   TEXT NOT NULL
                            CHECK (json_valid(title_options) AND json_array_length(title_options) = 5),
            created_at      INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_generations_created
            ON generations (created_at DESC, id DESC);

        -- User-finalized results.
        CREATE TABLE IF NOT EXISTS saved_results (
            id                    INTEGER PRIMARY KEY AUTOINCREMENT,
            generation_id         INTEGER REFERENCES generations(id) ON DELETE CASCADE,
            transcript            TEXT NOT NULL,
            final_description     TEXT NOT NULL,
            final_thumbnail_title TEXT NOT NULL,
            final_video_title     TEXT NOT NULL,
            final_tags            TEXT NOT NULL,
            created_at            INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_saved_results_created
            ON saved_results (created_at DESC, id DESC);

        CREATE INDEX IF NOT EXISTS idx_saved_results_generation
            ON saved_results (generation_id)
            WHERE generation_id IS NOT NULL;

        -- Style samples.
        CREATE TABLE IF NOT EXISTS training_examples (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            example_type    TEXT NOT NULL
                            CHECK (example_type IN ('title', 'description', 'tags', 'complete')),
            title           TEXT,
            description     TEXT,
            tags            TEXT,
            notes           TEXT,
            created_at      INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_training_examples_created
            ON training_examples (created_at DESC, id DESC);

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| SeoforgeError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
