//! Error types for content generation.

use seoforge_core::error::SeoforgeError;

/// Errors from the content generation pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    /// Caller input was unusable; no upstream call was made.
    #[error("{0}")]
    Validation(String),
    /// The AI endpoint could not be reached.
    #[error("Failed to connect to AI service: {0}")]
    UpstreamUnavailable(String),
    /// The AI endpoint answered with a non-success status.
    #[error("AI generation failed: [{status}] {detail}")]
    UpstreamError { status: u16, detail: String },
    /// The AI endpoint answered, but not with usable content.
    #[error("{message}: {detail}")]
    UpstreamFormat { message: String, detail: String },
    #[error("storage error: {0}")]
    Storage(String),
}

impl GenerateError {
    pub(crate) fn format(message: &str, detail: impl Into<String>) -> Self {
        GenerateError::UpstreamFormat {
            message: message.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<SeoforgeError> for GenerateError {
    fn from(err: SeoforgeError) -> Self {
        match err {
            SeoforgeError::Validation(msg) => GenerateError::Validation(msg),
            other => GenerateError::Storage(other.to_string()),
        }
    }
}
