//! CLI argument definitions for the seoforge server.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use seoforge_core::config::SeoforgeConfig;

/// seoforge - YouTube title, description and tag generation from transcripts.
#[derive(Parser, Debug, Default)]
#[command(name = "seoforge", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// Data directory for the SQLite database.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// URL the generation requests are POSTed to.
    #[arg(long = "ai-endpoint")]
    pub ai_endpoint: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SEOFORGE_CONFIG env var > ~/.seoforge/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        self.resolve_config_path_with(|key| std::env::var(key).ok())
    }

    fn resolve_config_path_with(&self, env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Some(p) = env("SEOFORGE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Overlay flags and environment variables onto a loaded config.
    pub fn apply(&self, config: &mut SeoforgeConfig) {
        self.apply_with(config, |key| std::env::var(key).ok());
    }

    fn apply_with(&self, config: &mut SeoforgeConfig, env: impl Fn(&str) -> Option<String>) {
        if let Some(port) = self
            .port
            .or_else(|| env("SEOFORGE_PORT").and_then(|v| v.parse::<u16>().ok()))
        {
            config.general.port = port;
        }

        if let Some(ref dir) = self.data_dir {
            config.general.data_dir = dir.to_string_lossy().to_string();
        }

        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }

        if let Some(endpoint) = self
            .ai_endpoint
            .clone()
            .or_else(|| env("SEOFORGE_AI_ENDPOINT"))
        {
            config.ai.endpoint = endpoint;
        }

        if let Some(key) = env("SEOFORGE_AI_API_KEY") {
            config.ai.api_key = key;
        }
    }
}

/// Expand a leading `~` to the home directory.
pub fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if let Some(rest) = data_dir
        .strip_prefix("~/")
        .or_else(|| data_dir.strip_prefix("~\\"))
    {
        PathBuf::from(home_dir()).join(rest)
    } else {
        PathBuf::from(data_dir)
    }
}

fn home_dir() -> String {
    #[cfg(target_os = "windows")]
    let home = std::env::var("USERPROFILE");
    #[cfg(not(target_os = "windows"))]
    let home = std::env::var("HOME");
    home.unwrap_or_else(|_| ".".to_string())
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    PathBuf::from(home_dir()).join(".seoforge").join("config.toml")
}
