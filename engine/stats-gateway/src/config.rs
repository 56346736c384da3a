//! Configuration for the StatsGateway

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main configuration for the StatsGateway
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: crate::DEFAULT_PORT }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "compact".to_string() }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("GATEWAY_HOST") {
            config.server.host = host;
        }

        if let Some(port) = lookup("GATEWAY_PORT") {
            config.server.port =
                port.parse().with_context(|| format!("GATEWAY_PORT must be a port number, got '{}'", port))?;
        }

        if let Some(level) = lookup("LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.logging.level = level;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }
}
