//! SportsDataIO Fetcher
//!
//! Pulls NFL statistics from the SportsDataIO stats API and caches them in the
//! document store: player game logs keyed by player, season and first game, and
//! team profiles merged per season in one atomic batch.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod pipeline;
pub mod scheduler;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::FetcherConfig;
pub use error::{FetchError, RefreshError};
pub use fetcher::{ProviderUrls, SportsDataIOFetcher, StatsProvider};
pub use models::*;
pub use pipeline::RefreshPipeline;
pub use scheduler::RefreshScheduler;
