use thiserror::Error;

/// Top-level error type for seoforge.
///
/// Subsystem crates define their own error types and implement
/// `From<SeoforgeError>` so the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeoforgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SeoforgeError {
    /// True when the error was caused by caller input rather than a fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, SeoforgeError::Validation(_))
    }
}

impl From<toml::de::Error> for SeoforgeError {
    fn from(err: toml::de::Error) -> Self {
        SeoforgeError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SeoforgeError {
    fn from(err: serde_json::Error) -> Self {
        SeoforgeError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for seoforge operations.
pub type Result<T> = std::result::Result<T, SeoforgeError>;
