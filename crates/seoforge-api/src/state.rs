//! Application state shared across all route handlers.
//!
//! AppState holds the services and shared resources. It is passed to
//! handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use seoforge_core::config::SeoforgeConfig;
use seoforge_generate::{CompletionBackend, GenerationService};
use seoforge_storage::{Database, HistoryService, SaveService, TrainingExampleService};

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<SeoforgeConfig>,
    /// SQLite database for persistent storage.
    pub database: Arc<Database>,
    /// Transcript to content drafts.
    pub generation: Arc<GenerationService>,
    pub history: Arc<HistoryService>,
    pub saves: Arc<SaveService>,
    pub training: Arc<TrainingExampleService>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Wire every service onto one database and AI backend.
    pub fn new(
        config: SeoforgeConfig,
        database: Database,
        backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        let database = Arc::new(database);
        let generation = GenerationService::new(
            Arc::clone(&database),
            backend,
            config.generation.clone(),
            config.ai.clone(),
        );

        Self {
            history: Arc::new(HistoryService::new(
                Arc::clone(&database),
                config.history.default_limit,
            )),
            saves: Arc::new(SaveService::new(Arc::clone(&database))),
            training: Arc::new(TrainingExampleService::new(Arc::clone(&database))),
            generation: Arc::new(generation),
            config: Arc::new(config),
            database,
            start_time: Instant::now(),
        }
    }
}
