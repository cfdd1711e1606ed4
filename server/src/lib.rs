//! YARRRML conversion server
//!
//! A thin HTTP wrapper around the [`yarrrml`] crate:
//! YARRRML documents sent to `/` (with `GET` or `POST`)
//! are answered with the equivalent RML rules.
//!
//! # Example
//!
//! ```ignore
//! use yarrrml_server::{ServerConfig, YarrrmlServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = YarrrmlServer::new(ServerConfig::default()).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::AppState;

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// YARRRML HTTP Server
pub struct YarrrmlServer {
    /// Application state
    state: Arc<AppState>,
    /// Configured router
    router: Router,
}

impl YarrrmlServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> Result<Self> {
        let state = Arc::new(AppState::new(config)?);
        let router = routes::build_router(state.clone());
        Ok(Self { state, router })
    }

    /// Get a reference to the application state
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Get the router for testing
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let addr = self.state.config.listen_addr;
        let listener = TcpListener::bind(addr).await?;
        log::info!(
            "listening on {addr} (default base <{}>)",
            self.state.default_base
        );
        axum::serve(listener, self.router).await
    }
}
