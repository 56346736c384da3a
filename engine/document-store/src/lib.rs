//! # Document Store
//!
//! Keyed JSON document storage for provider data.
//!
//! ## Architecture
//!
//! - **DocumentStore**: Abstract trait for storage backends
//! - **PostgresStore**: JSONB rows in a single `documents` table
//! - **MemoryStore**: In-process map for development and tests
//! - **WriteBatch**: Writes staged for one atomic commit
//!
//! Documents are addressed by `collection/id`. A write either replaces the
//! whole document or shallow-merges its top-level fields into the existing one,
//! and may ask the store to stamp fields with the server clock.

pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;

pub use backend::DocumentStore;
pub use config::{StoreBackend, StoreConfig};
pub use document::{Document, DocumentPath, DocumentWrite, WriteBatch, WriteMode};
pub use error::{Result, StoreError};
pub use memory::{MemoryStore, StoreStats};
pub use postgres::PostgresStore;

use std::sync::Arc;

/// Build the configured backend, creating the schema where needed
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend {
        StoreBackend::Postgres => {
            let store = PostgresStore::connect(config).await?;
            store.initialize().await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; documents are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
