//! YARRRML conversion server CLI
//!
//! Run with: `cargo run -p yarrrml_server -- --help`

use clap::Parser;
use yarrrml_server::{ServerConfig, YarrrmlServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    // RUST_LOG takes precedence over --log-level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    log::info!(
        "starting yarrrml-server {} on {}",
        env!("CARGO_PKG_VERSION"),
        config.listen_addr
    );
    let server = YarrrmlServer::new(config)?;
    server.run().await.map_err(Into::into)
}
