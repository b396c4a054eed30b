//! The content generation pipeline.
//!
//! `generate` validates the transcript, gathers style context, calls the
//! backend, validates the structured reply and records the generation. Only
//! the backend call and reply validation can fail the request once the
//! transcript is accepted; context reads and the final insert degrade. If the
//! schema is missing, `generate` retries the bootstrap first.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use seoforge_core::config::{AiConfig, GenerationConfig};
use seoforge_core::types::{
    GeneratedContent, GenerationResult, NewGeneration, SavedResult, TrainingExample,
    TITLE_OPTION_COUNT,
};
use seoforge_storage::{Database, GenerationRepository, SavedResultRepository, TrainingExampleRepository};

use crate::backend::{truncate_chars, CompletionBackend};
use crate::error::GenerateError;
use crate::prompt;

/// Style context gathered for one prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub training: Vec<TrainingExample>,
    pub saved: Vec<SavedResult>,
    pub training_degraded: bool,
    pub saved_degraded: bool,
}

impl PromptContext {
    pub fn report(&self) -> ContextReport {
        ContextReport {
            training_examples: self.training.len(),
            saved_results: self.saved.len(),
            training_degraded: self.training_degraded,
            saved_degraded: self.saved_degraded,
        }
    }
}

/// How much context went into a generation, and which reads fell back to empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ContextReport {
    pub training_examples: usize,
    pub saved_results: usize,
    pub training_degraded: bool,
    pub saved_degraded: bool,
}

/// A successful generation plus its context report.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub result: GenerationResult,
    pub context: ContextReport,
}

/// Parse and check the model's content string.
///
/// The content must be the JSON object described by [`prompt::output_schema`]
/// with exactly five title options.
pub fn parse_content(raw: &str) -> Result<GeneratedContent, GenerateError> {
    let content: GeneratedContent = serde_json::from_str(raw).map_err(|e| {
        error!(error = %e, sample = %truncate_chars(raw, 200), "AI content is not the expected JSON");
        GenerateError::format("Unexpected AI response format", "Could not parse content")
    })?;

    let count = content.video_title_options.len();
    if count != TITLE_OPTION_COUNT {
        error!(count, "AI content has the wrong number of title options");
        return Err(GenerateError::format(
            "AI response missing required fields",
            format!("expected {} video_title_options, got {}", TITLE_OPTION_COUNT, count),
        ));
    }

    Ok(content)
}

/// Turns transcripts into stored content drafts.
pub struct GenerationService {
    db: Arc<Database>,
    generations: GenerationRepository,
    saved: SavedResultRepository,
    training: TrainingExampleRepository,
    backend: Arc<dyn CompletionBackend>,
    limits: GenerationConfig,
    ai: AiConfig,
}

impl GenerationService {
    pub fn new(
        db: Arc<Database>,
        backend: Arc<dyn CompletionBackend>,
        limits: GenerationConfig,
        ai: AiConfig,
    ) -> Self {
        Self {
            generations: GenerationRepository::new(Arc::clone(&db)),
            saved: SavedResultRepository::new(Arc::clone(&db)),
            training: TrainingExampleRepository::new(Arc::clone(&db)),
            db,
            backend,
            limits,
            ai,
        }
    }

    pub fn backend(&self) -> &Arc<dyn CompletionBackend> {
        &self.backend
    }

    /// Read the most recent training examples and saved results. Each read
    /// that fails is logged and replaced with an empty list.
    pub fn load_context(&self) -> PromptContext {
        let mut context = PromptContext::default();

        match self.training.list(Some(self.limits.training_context_limit)) {
            Ok(rows) => context.training = rows,
            Err(e) => {
                warn!(error = %e, "Training examples unavailable; continuing without them");
                context.training_degraded = true;
            }
        }

        match self.saved.recent(self.limits.saved_context_limit) {
            Ok(rows) => context.saved = rows,
            Err(e) => {
                warn!(error = %e, "Saved results unavailable; continuing without them");
                context.saved_degraded = true;
            }
        }

        context
    }

    /// Generate content for one transcript.
    pub async fn generate(&self, transcript: &str) -> Result<GenerationOutcome, GenerateError> {
        if transcript.trim().is_empty() {
            return Err(GenerateError::Validation("Transcript is required".to_string()));
        }

        // Startup bootstrap failed earlier; try again before touching the tables.
        if !self.db.schema_ready() && self.db.bootstrap_schema() {
            info!("Schema created on generate");
        }

        let context = self.load_context();
        let report = context.report();
        debug!(
            training = report.training_examples,
            saved = report.saved_results,
            "Prompt context loaded"
        );

        let block = prompt::build_context_block(&context.training, &context.saved);
        let request = prompt::build_request(transcript, &block, &self.ai);

        let raw = self.backend.complete(&request).await?;
        let content = parse_content(&raw)?;

        let new = NewGeneration {
            transcript: transcript.to_string(),
            content,
        };
        let stored = match self.generations.insert(&new) {
            Ok(generation) => {
                info!(id = generation.id, "Generation stored");
                Some(generation)
            }
            Err(e) => {
                error!(error = %e, "Failed to store generation; returning content unsaved");
                None
            }
        };

        Ok(GenerationOutcome {
            result: GenerationResult::from_content(new.content, stored.as_ref()),
            context: report,
        })
    }
}
