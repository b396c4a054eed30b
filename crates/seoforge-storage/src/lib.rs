//! seoforge storage crate - SQLite persistence and the record services.
//!
//! Provides a WAL-mode SQLite database with a versioned schema bootstrap,
//! per-table repositories for generations, saved results and training
//! examples, and the history / save / training example services built on top.

pub mod db;
pub mod migrations;
pub mod repository;
pub mod services;

pub use db::Database;
pub use repository::{GenerationRepository, SavedResultRepository, TrainingExampleRepository};
pub use services::{
    parse_int_param, HistoryService, SaveRequest, SaveService, TrainingExampleRequest,
    TrainingExampleService,
};
