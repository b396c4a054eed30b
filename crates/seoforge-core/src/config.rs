use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;

/// Top-level configuration for seoforge.
///
/// Loaded from `~/.seoforge/config.toml` by default. Every section falls back
/// to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeoforgeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl SeoforgeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SeoforgeConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory holding the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// API server port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.seoforge/data".to_string(),
            log_level: "info".to_string(),
            port: 3040,
        }
    }
}

/// Generative-AI endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Full URL the chat-style completion request is POSTed to.
    pub endpoint: String,
    /// Bearer token. Empty means no Authorization header.
    pub api_key: String,
    /// Model name. Empty means the field is left out of the payload.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Name attached to the JSON-schema constraint.
    pub schema_name: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8787/integrations/google-gemini-2-5-pro/".to_string(),
            api_key: String::new(),
            model: String::new(),
            timeout_secs: 30,
            schema_name: "youtube_content".to_string(),
        }
    }
}

/// How much prior data is folded into the prompt context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Most-recent training examples to include.
    pub training_context_limit: u32,
    /// Most-recent saved results to include.
    pub saved_context_limit: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            training_context_limit: 20,
            saved_context_limit: 10,
        }
    }
}

/// History listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Page size used when the caller gives no usable `limit`.
    pub default_limit: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { default_limit: 50 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeoforgeError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = SeoforgeConfig::default();
        assert_eq!(config.general.data_dir, "~/.seoforge/data");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.port, 3040);
        assert_eq!(config.ai.timeout_secs, 30);
        assert!(config.ai.api_key.is_empty());
        assert!(config.ai.model.is_empty());
        assert_eq!(config.ai.schema_name, "youtube_content");
        assert_eq!(config.generation.training_context_limit, 20);
        assert_eq!(config.generation.saved_context_limit, 10);
        assert_eq!(config.history.default_limit, 50);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/srv/seoforge"
log_level = "debug"
port = 9000

[ai]
endpoint = "https://ai.example.com/v1/complete"
api_key = "sk-test"
model = "gemini-2.5-pro"
timeout_secs = 10

[generation]
training_context_limit = 5
saved_context_limit = 3

[history]
default_limit = 25
"#;
        let file = create_temp_config(content);
        let config = SeoforgeConfig::load(file.path()).unwrap();

        assert_eq!(config.general.data_dir, "/srv/seoforge");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.port, 9000);
        assert_eq!(config.ai.endpoint, "https://ai.example.com/v1/complete");
        assert_eq!(config.ai.api_key, "sk-test");
        assert_eq!(config.ai.model, "gemini-2.5-pro");
        assert_eq!(config.ai.timeout_secs, 10);
        assert_eq!(config.ai.schema_name, "youtube_content");
        assert_eq!(config.generation.training_context_limit, 5);
        assert_eq!(config.generation.saved_context_limit, 3);
        assert_eq!(config.history.default_limit, 25);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = SeoforgeConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.port, 3040);
        assert_eq!(config.ai.timeout_secs, 30);
        assert_eq!(config.history.default_limit, 50);
    }

    #[test]
    fn test_load_invalid_toml_is_config_error() {
        let file = create_temp_config("[general\nport = ");
        let err = SeoforgeConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, SeoforgeError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = SeoforgeConfig::load(Path::new("/nonexistent/seoforge/config.toml")).unwrap_err();
        assert!(matches!(err, SeoforgeError::Io(_)));
    }
}
