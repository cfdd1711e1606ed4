//! Application state shared by all handlers.

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use reqwest::Client;
use std::time::Duration;
use yarrrml::base::normalize_base;

/// Immutable state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// The configured default base, normalized
    pub default_base: String,
    /// HTTP client fetching YARRRML documents given by URL
    pub client: Client,
}

impl AppState {
    /// Build the state, checking that the configured default base is a valid IRI.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let default_base = normalize_base(&config.default_base)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout))
            .user_agent(concat!("yarrrml-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServerError::Internal(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            config,
            default_base,
            client,
        })
    }
}
