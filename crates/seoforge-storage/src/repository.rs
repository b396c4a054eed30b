//! Repository implementations for SQLite-backed persistence.
//!
//! One repository per table. Each insert stamps `created_at` with the current
//! time in unix milliseconds and reads the stored row back so callers see
//! exactly what was persisted. Listings are newest first, ties broken by id.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, OptionalExtension, Row};

use seoforge_core::error::SeoforgeError;
use seoforge_core::types::{
    ExampleType, Generation, NewGeneration, NewSavedResult, NewTrainingExample, SavedResult,
    TrainingExample,
};

use crate::db::Database;

const GENERATION_COLUMNS: &str =
    "id, transcript, description, thumbnail_title, video_title, tags, title_options, created_at";

const SAVED_RESULT_COLUMNS: &str = "id, generation_id, transcript, final_description, \
     final_thumbnail_title, final_video_title, final_tags, created_at";

const TRAINING_EXAMPLE_COLUMNS: &str =
    "id, example_type, title, description, tags, notes, created_at";

fn storage_err(context: &str) -> impl Fn(rusqlite::Error) -> SeoforgeError + '_ {
    move |e| SeoforgeError::Storage(format!("{}: {}", context, e))
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

// =============================================================================
// Generations
// =============================================================================

/// Repository for AI-produced drafts.
pub struct GenerationRepository {
    db: Arc<Database>,
}

impl GenerationRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a generation and return the persisted row.
    pub fn insert(&self, new: &NewGeneration) -> Result<Generation, SeoforgeError> {
        let title_options = serde_json::to_string(&new.content.video_title_options)?;

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO generations (transcript, description, thumbnail_title, video_title, tags, title_options, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    new.transcript,
                    new.content.description,
                    new.content.thumbnail_title,
                    new.content.primary_title(),
                    new.content.tags,
                    title_options,
                    now_millis(),
                ],
            )
            .map_err(storage_err("Failed to insert generation"))?;

            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {} FROM generations WHERE id = ?1", GENERATION_COLUMNS),
                params![id],
                row_to_generation,
            )
            .map_err(storage_err("Failed to read back generation"))
        })
    }

    /// Find a generation by id.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Generation>, SeoforgeError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM generations WHERE id = ?1", GENERATION_COLUMNS),
                params![id],
                row_to_generation,
            )
            .optional()
            .map_err(storage_err("Failed to load generation"))
        })
    }

    /// Count stored generations.
    pub fn count(&self) -> Result<u64, SeoforgeError> {
        self.db.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM generations", [], |row| row.get::<_, i64>(0))
                .map(|n| n as u64)
                .map_err(storage_err("Failed to count generations"))
        })
    }
}

fn row_to_generation(row: &Row<'_>) -> rusqlite::Result<Generation> {
    let options_json: String = row.get(6)?;
    let title_options: Vec<String> = serde_json::from_str(&options_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Generation {
        id: row.get(0)?,
        transcript: row.get(1)?,
        description: row.get(2)?,
        thumbnail_title: row.get(3)?,
        video_title: row.get(4)?,
        tags: row.get(5)?,
        title_options,
        created_at: millis_to_datetime(row.get(7)?),
    })
}

// =============================================================================
// Saved results
// =============================================================================

/// Repository for user-finalized results.
pub struct SavedResultRepository {
    db: Arc<Database>,
}

impl SavedResultRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a saved result and return the persisted row.
    pub fn insert(&self, new: &NewSavedResult) -> Result<SavedResult, SeoforgeError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO saved_results (generation_id, transcript, final_description, final_thumbnail_title, final_video_title, final_tags, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    new.generation_id,
                    new.transcript,
                    new.final_description,
                    new.final_thumbnail_title,
                    new.final_video_title,
                    new.final_tags,
                    now_millis(),
                ],
            )
            .map_err(storage_err("Failed to insert saved result"))?;

            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("SELECT {} FROM saved_results WHERE id = ?1", SAVED_RESULT_COLUMNS),
                params![id],
                row_to_saved_result,
            )
            .map_err(storage_err("Failed to read back saved result"))
        })
    }

    /// Page through saved results, newest first.
    ///
    /// `limit` and `offset` are passed to SQLite as-is.
    pub fn page(&self, limit: i64, offset: i64) -> Result<Vec<SavedResult>, SeoforgeError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM saved_results
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?1 OFFSET ?2",
                    SAVED_RESULT_COLUMNS
                ))
                .map_err(storage_err("Saved results query prepare"))?;

            let rows = stmt
                .query_map(params![limit, offset], row_to_saved_result)
                .map_err(storage_err("Saved results query"))?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(storage_err("Saved results row"))
        })
    }

    /// The most recent `limit` saved results.
    pub fn recent(&self, limit: u32) -> Result<Vec<SavedResult>, SeoforgeError> {
        self.page(i64::from(limit), 0)
    }
}

fn row_to_saved_result(row: &Row<'_>) -> rusqlite::Result<SavedResult> {
    Ok(SavedResult {
        id: row.get(0)?,
        generation_id: row.get(1)?,
        transcript: row.get(2)?,
        final_description: row.get(3)?,
        final_thumbnail_title: row.get(4)?,
        final_video_title: row.get(5)?,
        final_tags: row.get(6)?,
        created_at: millis_to_datetime(row.get(7)?),
    })
}

// =============================================================================
// Training examples
// =============================================================================

/// Repository for style samples.
pub struct TrainingExampleRepository {
    db: Arc<Database>,
}

impl TrainingExampleRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a training example and return the persisted row.
    pub fn insert(&self, new: &NewTrainingExample) -> Result<TrainingExample, SeoforgeError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO training_examples (example_type, title, description, tags, notes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    new.example_type.as_str(),
                    new.title,
                    new.description,
                    new.tags,
                    new.notes,
                    now_millis(),
                ],
            )
            .map_err(storage_err("Failed to insert training example"))?;

            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!(
                    "SELECT {} FROM training_examples WHERE id = ?1",
                    TRAINING_EXAMPLE_COLUMNS
                ),
                params![id],
                row_to_training_example,
            )
            .map_err(storage_err("Failed to read back training example"))
        })
    }

    /// All training examples, newest first. `None` means no limit.
    pub fn list(&self, limit: Option<u32>) -> Result<Vec<TrainingExample>, SeoforgeError> {
        let limit = limit.map(i64::from).unwrap_or(-1);
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM training_examples
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?1",
                    TRAINING_EXAMPLE_COLUMNS
                ))
                .map_err(storage_err("Training examples query prepare"))?;

            let rows = stmt
                .query_map(params![limit], row_to_training_example)
                .map_err(storage_err("Training examples query"))?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(storage_err("Training examples row"))
        })
    }

    /// Delete by id. Returns the number of rows removed (0 or 1).
    pub fn delete(&self, id: i64) -> Result<usize, SeoforgeError> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM training_examples WHERE id = ?1", params![id])
                .map_err(storage_err("Failed to delete training example"))
        })
    }
}

fn row_to_training_example(row: &Row<'_>) -> rusqlite::Result<TrainingExample> {
    let kind: String = row.get(1)?;
    let example_type: ExampleType = kind.parse().map_err(|e: SeoforgeError| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(TrainingExample {
        id: row.get(0)?,
        example_type,
        title: row.get(2)?,
        description: row.get(3)?,
        tags: row.get(4)?,
        notes: row.get(5)?,
        created_at: millis_to_datetime(row.get(6)?),
    })
}
