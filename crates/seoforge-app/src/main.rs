//! seoforge application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Initialize tracing
//! 3. Open SQLite and bootstrap the schema
//! 4. Build the AI backend and the services
//! 5. Start the axum REST API server

mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use seoforge_api::routes;
use seoforge_api::state::AppState;
use seoforge_core::config::SeoforgeConfig;
use seoforge_generate::{CompletionBackend, HttpBackend};
use seoforge_storage::Database;

use crate::cli::{resolve_data_dir, CliArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing so the configured level can apply.
    let config_file = args.resolve_config_path();
    let (mut config, load_error) = match SeoforgeConfig::load(&config_file) {
        Ok(config) => (config, None),
        Err(e) => (SeoforgeConfig::default(), Some(e)),
    };
    args.apply(&mut config);

    // Tracing: RUST_LOG wins, then the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting seoforge v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(e) if config_file.exists() => {
            tracing::warn!(path = %config_file.display(), error = %e, "Invalid config file, using defaults")
        }
        Some(_) => tracing::info!(path = %config_file.display(), "No config file, using defaults"),
    }

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    let db_path = data_dir.join("seoforge.db");
    let db = Database::new(&db_path)?;
    tracing::info!(
        path = %db_path.display(),
        schema_ready = db.schema_ready(),
        "SQLite database opened"
    );

    // AI backend.
    let backend: Arc<dyn CompletionBackend> = Arc::new(HttpBackend::new(&config.ai)?);
    tracing::info!(endpoint = %backend.endpoint(), "AI backend configured");

    // === API server ===
    let state = AppState::new(config.clone(), db, backend);
    if let Err(e) = routes::start_server(&config, state).await {
        tracing::error!(error = %e, "API server stopped");
        tracing::error!(
            "Try: SEOFORGE_PORT={} cargo run -p seoforge-app",
            config.general.port.saturating_add(1)
        );
        return Err(e.into());
    }

    Ok(())
}
