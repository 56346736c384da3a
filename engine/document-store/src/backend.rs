//! Document store backend trait

use crate::document::{Document, DocumentPath, DocumentWrite, WriteBatch};
use crate::error::Result;

/// Abstract trait for document store backends
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load a document, `None` if it has never been written
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>>;

    /// Apply a single write
    async fn set(&self, write: DocumentWrite) -> Result<()>;

    /// Apply every staged write atomically: all of them land or none do.
    /// Returns the number of writes committed.
    async fn commit(&self, batch: WriteBatch) -> Result<usize>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
