//! Record services for the API layer: history listing, saving a finalized
//! result, and training example management.
//!
//! Services own input validation; repositories own SQL.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use seoforge_core::error::SeoforgeError;
use seoforge_core::types::{
    ExampleType, NewSavedResult, NewTrainingExample, SavedResult, TrainingExample,
};

use crate::db::Database;
use crate::repository::{SavedResultRepository, TrainingExampleRepository};

/// Parse an integer query parameter the forgiving way: optional sign followed
/// by leading digits, anything after them ignored. No digits yields `default`;
/// negative values clamp to zero.
pub fn parse_int_param(raw: Option<&str>, default: i64) -> i64 {
    let Some(raw) = raw else {
        return default;
    };
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return default;
    }
    if negative {
        return 0;
    }
    digits[..end].parse::<i64>().unwrap_or(i64::MAX)
}

// =============================================================================
// History
// =============================================================================

/// Lists previously saved final results.
pub struct HistoryService {
    repo: SavedResultRepository,
    default_limit: i64,
}

impl HistoryService {
    pub fn new(db: Arc<Database>, default_limit: i64) -> Self {
        Self {
            repo: SavedResultRepository::new(db),
            default_limit,
        }
    }

    /// Page size used when the caller gives none.
    pub fn default_limit(&self) -> i64 {
        self.default_limit
    }

    /// Saved results, newest first. No upper bound is applied to either argument.
    pub fn list_history(&self, limit: i64, offset: i64) -> Result<Vec<SavedResult>, SeoforgeError> {
        let rows = self.repo.page(limit.max(0), offset.max(0))?;
        debug!(limit, offset, returned = rows.len(), "History listed");
        Ok(rows)
    }
}

// =============================================================================
// Save
// =============================================================================

/// Body of `POST /results`. Every field is optional here so that a missing
/// field surfaces as a validation error rather than a deserialization one.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveRequest {
    pub generation_id: Option<i64>,
    pub transcript: Option<String>,
    pub final_description: Option<String>,
    pub final_thumbnail_title: Option<String>,
    pub final_video_title: Option<String>,
    pub final_tags: Option<String>,
}

impl SaveRequest {
    /// Check required fields and build the insert.
    ///
    /// A `generationId` of 0 is treated the same as an absent one.
    pub fn validate(self) -> Result<NewSavedResult, SeoforgeError> {
        fn required(value: Option<String>, name: &str, missing: &mut Vec<String>) -> String {
            match value {
                Some(v) if !v.is_empty() => v,
                _ => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        }

        let mut missing = Vec::new();
        let transcript = required(self.transcript, "transcript", &mut missing);
        let final_description = required(self.final_description, "finalDescription", &mut missing);
        let final_thumbnail_title =
            required(self.final_thumbnail_title, "finalThumbnailTitle", &mut missing);
        let final_video_title = required(self.final_video_title, "finalVideoTitle", &mut missing);
        let final_tags = required(self.final_tags, "finalTags", &mut missing);

        if !missing.is_empty() {
            return Err(SeoforgeError::Validation(format!(
                "All fields are required (missing: {})",
                missing.join(", ")
            )));
        }

        Ok(NewSavedResult {
            generation_id: self.generation_id.filter(|id| *id != 0),
            transcript,
            final_description,
            final_thumbnail_title,
            final_video_title,
            final_tags,
        })
    }
}

/// Persists a user's finalized edit of a generation.
pub struct SaveService {
    repo: SavedResultRepository,
}

impl SaveService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            repo: SavedResultRepository::new(db),
        }
    }

    /// Validate and store one result, returning the row as created.
    pub fn save_result(&self, request: SaveRequest) -> Result<SavedResult, SeoforgeError> {
        let new = request.validate()?;
        let saved = self.repo.insert(&new)?;
        info!(id = saved.id, generation_id = ?saved.generation_id, "Result saved");
        Ok(saved)
    }
}

// =============================================================================
// Training examples
// =============================================================================

/// Body of `POST /training`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingExampleRequest {
    pub example_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub notes: Option<String>,
}

impl TrainingExampleRequest {
    /// Check the example type and normalise optional fields. Empty strings
    /// are stored as NULL, same as absent ones.
    pub fn validate(self) -> Result<NewTrainingExample, SeoforgeError> {
        let example_type: ExampleType = self
            .example_type
            .as_deref()
            .unwrap_or_default()
            .parse()?;

        let present = |v: Option<String>| v.filter(|s| !s.is_empty());

        Ok(NewTrainingExample {
            example_type,
            title: present(self.title),
            description: present(self.description),
            tags: present(self.tags),
            notes: present(self.notes),
        })
    }
}

/// CRUD over reusable style examples.
pub struct TrainingExampleService {
    repo: TrainingExampleRepository,
}

impl TrainingExampleService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            repo: TrainingExampleRepository::new(db),
        }
    }

    /// All examples, newest first.
    pub fn list_examples(&self) -> Result<Vec<TrainingExample>, SeoforgeError> {
        self.repo.list(None)
    }

    /// Validate and store one example.
    pub fn create_example(
        &self,
        request: TrainingExampleRequest,
    ) -> Result<TrainingExample, SeoforgeError> {
        let new = request.validate()?;
        let example = self.repo.insert(&new)?;
        info!(id = example.id, example_type = %example.example_type, "Training example created");
        Ok(example)
    }

    /// Delete by id. Deleting an id that does not exist still succeeds.
    pub fn delete_example(&self, id: Option<&str>) -> Result<bool, SeoforgeError> {
        let raw = id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SeoforgeError::Validation("ID is required".to_string()))?;
        let id: i64 = raw
            .parse()
            .map_err(|_| SeoforgeError::Validation(format!("Invalid ID: '{}'", raw)))?;

        let removed = self.repo.delete(id)?;
        info!(id, removed, "Training example delete");
        Ok(true)
    }
}
