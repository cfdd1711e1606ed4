//! Server configuration, from the command line or the environment.

use clap::Parser;
use std::net::SocketAddr;
use yarrrml::base::DEFAULT_BASE;

/// YARRRML conversion server configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "yarrrml-server")]
#[command(about = "HTTP service converting YARRRML mappings into RML rules", version)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "YARRRML_LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: SocketAddr,

    /// Base IRI of the generated rules, when neither the request
    /// nor the document provides one
    #[arg(long, env = "YARRRML_DEFAULT_BASE", default_value = DEFAULT_BASE)]
    pub default_base: String,

    /// Request body size limit in bytes (default 2MiB)
    #[arg(long, env = "YARRRML_BODY_LIMIT", default_value = "2097152")]
    pub body_limit: usize,

    /// Timeout in seconds when fetching a YARRRML document from a URL
    #[arg(long, env = "YARRRML_FETCH_TIMEOUT", default_value = "30")]
    pub fetch_timeout: u64,

    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    #[arg(long, env = "YARRRML_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            default_base: DEFAULT_BASE.to_string(),
            body_limit: 2 * 1024 * 1024, // 2MiB
            fetch_timeout: 30,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cli_defaults_match_default() {
        let parsed = ServerConfig::parse_from(["yarrrml-server"]);
        let default = ServerConfig::default();
        assert_eq!(parsed.listen_addr, default.listen_addr);
        assert_eq!(parsed.default_base, default.default_base);
        assert_eq!(parsed.body_limit, default.body_limit);
        assert_eq!(parsed.fetch_timeout, default.fetch_timeout);
        assert_eq!(parsed.log_level, default.log_level);
    }

    #[test]
    fn cli_flags() {
        let parsed = ServerConfig::parse_from([
            "yarrrml-server",
            "--listen-addr",
            "127.0.0.1:8080",
            "--default-base",
            "http://rules.example.org/",
            "--body-limit",
            "1024",
            "--fetch-timeout",
            "5",
        ]);
        assert_eq!(parsed.listen_addr.port(), 8080);
        assert_eq!(parsed.default_base, "http://rules.example.org/");
        assert_eq!(parsed.body_limit, 1024);
        assert_eq!(parsed.fetch_timeout, 5);
    }
}
