//! RFPilot Server
//!
//! HTTP surface for registering RFPs, processing their documents and
//! drafting proposal responses.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use rfpilot_llm::GatewayProvider;
use rfpilot_store::{FsBlobStore, SqliteStore};
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] rfpilot_store::StoreError),

    /// AI gateway client could not be built
    #[error("AI gateway error: {0}")]
    Llm(#[from] rfpilot_llm::LlmError),

    /// Pipeline could not be assembled
    #[error("Extractor error: {0}")]
    Extractor(#[from] rfpilot_extractor::ExtractorError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the application state from configuration
///
/// Opens the database, points the blob store at its root and connects the
/// AI gateway client.
pub fn build_state(config: &ServerConfig) -> Result<AppState<GatewayProvider>, ServerError> {
    let api_key = config.api_key().ok_or_else(|| {
        config::ConfigError::MissingField(format!(
            "llm.api_key (or {} environment variable)",
            config::API_KEY_ENV
        ))
    })?;

    let provider = GatewayProvider::new(&config.llm.endpoint, api_key)?
        .with_model(&config.llm.model)
        .with_timeout(config.llm.timeout_secs)?;
    let store = SqliteStore::new(&config.database_path)?;
    let blobs = FsBlobStore::new(&config.blob_root);

    Ok(AppState::new(
        provider,
        store,
        blobs,
        config.extractor.clone(),
    )?)
}

/// Start the RFPilot HTTP server
///
/// Builds the application state and serves the router until shutdown.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting RFPilot server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!("Blob root: {}", config.blob_root);
    info!("AI gateway: {} (model {})", config.llm.endpoint, config.llm.model);
    info!(
        "Remote failure policy: {:?}",
        config.extractor.remote_failure_policy
    );

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("RFPilot listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
