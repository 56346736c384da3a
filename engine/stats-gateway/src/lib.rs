//! StatsGateway - REST API over the SportsDataIO refresh pipeline
//!
//! Exposes the read-through game log endpoint, the game log refresh and the
//! team profile refresh, plus a health check mounted at the root and under `/api`.

pub mod config;
pub mod error;
pub mod logging;
pub mod rest_api;

pub use config::GatewayConfig;
pub use error::ApiError;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8081;
