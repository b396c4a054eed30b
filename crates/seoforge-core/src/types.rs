use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SeoforgeError;

/// Number of video title options every generation carries.
pub const TITLE_OPTION_COUNT: usize = 5;

// =============================================================================
// Enums
// =============================================================================

/// The kind of style sample a training example provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExampleType {
    Title,
    Description,
    Tags,
    /// A full title + description + tags set.
    Complete,
}

impl ExampleType {
    pub const ALL: [ExampleType; 4] = [
        ExampleType::Title,
        ExampleType::Description,
        ExampleType::Tags,
        ExampleType::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExampleType::Title => "title",
            ExampleType::Description => "description",
            ExampleType::Tags => "tags",
            ExampleType::Complete => "complete",
        }
    }
}

impl fmt::Display for ExampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExampleType {
    type Err = SeoforgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExampleType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SeoforgeError::Validation("Valid example type is required".to_string()))
    }
}

// =============================================================================
// Stored records
// =============================================================================

/// One AI-produced content draft tied to a transcript. Immutable once stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub id: i64,
    pub transcript: String,
    pub description: String,
    pub thumbnail_title: String,
    /// First entry of `title_options`.
    pub video_title: String,
    pub tags: String,
    pub title_options: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// The user-finalized edit of a generation (or of freeform input).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedResult {
    pub id: i64,
    pub generation_id: Option<i64>,
    pub transcript: String,
    pub final_description: String,
    pub final_thumbnail_title: String,
    pub final_video_title: String,
    pub final_tags: String,
    pub created_at: DateTime<Utc>,
}

/// A reusable style sample fed into future prompts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub id: i64,
    pub example_type: ExampleType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Inserts
// =============================================================================

/// Fields of a generation row before the store assigns id and timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct NewGeneration {
    pub transcript: String,
    pub content: GeneratedContent,
}

/// A validated save request.
#[derive(Clone, Debug, PartialEq)]
pub struct NewSavedResult {
    pub generation_id: Option<i64>,
    pub transcript: String,
    pub final_description: String,
    pub final_thumbnail_title: String,
    pub final_video_title: String,
    pub final_tags: String,
}

/// A validated training example insert. `None` fields are stored as NULL.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTrainingExample {
    pub example_type: ExampleType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Generation payloads
// =============================================================================

/// The structured content the AI model returns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub description: String,
    pub thumbnail_title: String,
    pub video_title_options: Vec<String>,
    pub tags: String,
}

impl GeneratedContent {
    /// The title stored as `video_title` on the generation row.
    pub fn primary_title(&self) -> &str {
        self.video_title_options
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// What `POST /content/generate` returns.
///
/// `id` and `created_at` are null when the generation row could not be
/// written; `db_saved` reports which case applies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub id: Option<i64>,
    pub description: String,
    pub thumbnail_title: String,
    pub video_title_options: Vec<String>,
    pub tags: String,
    pub created_at: Option<DateTime<Utc>>,
    pub db_saved: bool,
}

impl GenerationResult {
    /// Build a result from content, attaching the stored row when there is one.
    pub fn from_content(content: GeneratedContent, stored: Option<&Generation>) -> Self {
        Self {
            id: stored.map(|g| g.id),
            description: content.description,
            thumbnail_title: content.thumbnail_title,
            video_title_options: content.video_title_options,
            tags: content.tags,
            created_at: stored.map(|g| g.created_at),
            db_saved: stored.is_some(),
        }
    }
}
