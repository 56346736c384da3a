//! In-process document store used for development mode and tests

use crate::backend::DocumentStore;
use crate::document::{Document, DocumentPath, DocumentWrite, WriteBatch};
use crate::error::Result;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;

/// Write counters kept by [`MemoryStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Writes issued through `set`
    pub single_writes: u64,
    /// Batches committed
    pub batch_commits: u64,
    /// Writes applied as part of a batch
    pub batched_writes: u64,
}

/// Document store that keeps everything in a map behind a lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<DocumentPath, Document>>,
    stats: Mutex<StoreStats>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> StoreStats {
        *self.stats.lock()
    }

    /// Number of documents currently stored in `collection`
    pub fn count(&self, collection: &str) -> usize {
        self.documents.read().keys().filter(|path| path.collection() == collection).count()
    }

    /// Ids of every document in `collection`, in key order
    pub fn ids(&self, collection: &str) -> Vec<String> {
        self.documents
            .read()
            .keys()
            .filter(|path| path.collection() == collection)
            .map(|path| path.id().to_string())
            .collect()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>> {
        path.validate()?;
        Ok(self.documents.read().get(path).cloned())
    }

    async fn set(&self, write: DocumentWrite) -> Result<()> {
        write.validate()?;

        let mut documents = self.documents.write();
        let existing = documents.remove(&write.path);
        let doc = write.apply(existing, Utc::now());
        documents.insert(write.path.clone(), doc);

        self.stats.lock().single_writes += 1;
        tracing::debug!("Wrote document {}", write.path);
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<usize> {
        batch.validate()?;

        let now = Utc::now();
        let count = batch.len();
        let mut documents = self.documents.write();
        for write in batch.into_writes() {
            let existing = documents.remove(&write.path);
            let doc = write.apply(existing, now);
            documents.insert(write.path, doc);
        }

        let mut stats = self.stats.lock();
        stats.batch_commits += 1;
        stats.batched_writes += count as u64;

        tracing::debug!("Committed batch of {} writes", count);
        Ok(count)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
