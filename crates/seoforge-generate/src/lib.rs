//! Content generation for seoforge.
//!
//! Builds a context-augmented prompt from stored training examples and saved
//! results, sends it to the generative-AI backend with a strict JSON-schema
//! constraint, validates the structured reply, and records the generation.

pub mod backend;
pub mod error;
pub mod prompt;
pub mod service;

pub use backend::{
    ChatMessage, CompletionBackend, CompletionRequest, HttpBackend, JsonSchemaSpec, ProbeReport,
    ScriptedBackend,
};
pub use error::GenerateError;
pub use prompt::{build_context_block, build_request, output_schema};
pub use service::{parse_content, ContextReport, GenerationOutcome, GenerationService, PromptContext};
