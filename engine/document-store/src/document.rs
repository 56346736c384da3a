//! Document addressing and staged writes

use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;

/// A stored document: a JSON object with arbitrary fields
pub type Document = Map<String, Value>;

/// Address of a document: `collection/id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: String,
    id: String,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self { collection: collection.into(), id: id.into() }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reject empty segments and segments containing `/`
    pub fn validate(&self) -> Result<()> {
        for (what, segment) in [("collection", &self.collection), ("document id", &self.id)] {
            if segment.is_empty() {
                return Err(StoreError::invalid_path(format!("empty {}", what)));
            }
            if segment.contains('/') {
                return Err(StoreError::invalid_path(format!(
                    "{} '{}' must not contain '/'",
                    what, segment
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// How a write treats an existing document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite the whole document
    Replace,
    /// Shallow merge: top-level fields in the new data win, others are kept
    Merge,
}

/// A single document write, either issued directly or staged in a batch
#[derive(Debug, Clone)]
pub struct DocumentWrite {
    pub path: DocumentPath,
    pub data: Document,
    pub mode: WriteMode,
    /// Fields the store fills with its own clock at write time
    pub server_timestamps: Vec<String>,
}

impl DocumentWrite {
    pub fn replace(path: DocumentPath, data: Document) -> Self {
        Self { path, data, mode: WriteMode::Replace, server_timestamps: Vec::new() }
    }

    pub fn merge(path: DocumentPath, data: Document) -> Self {
        Self { path, data, mode: WriteMode::Merge, server_timestamps: Vec::new() }
    }

    /// Stamp `field` with the server time when the write is applied
    pub fn with_server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.server_timestamps.push(field.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.path.validate()
    }

    /// Compute the document that results from applying this write on top of `existing`
    pub fn apply(&self, existing: Option<Document>, now: DateTime<Utc>) -> Document {
        let mut doc = match (self.mode, existing) {
            (WriteMode::Merge, Some(mut current)) => {
                for (field, value) in &self.data {
                    current.insert(field.clone(), value.clone());
                }
                current
            }
            _ => self.data.clone(),
        };

        for field in &self.server_timestamps {
            doc.insert(field.clone(), Value::String(now.to_rfc3339()));
        }

        doc
    }
}

/// Writes staged for one atomic commit
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    writes: Vec<DocumentWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a write; nothing is persisted until the batch is committed
    pub fn set(&mut self, write: DocumentWrite) -> &mut Self {
        self.writes.push(write);
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[DocumentWrite] {
        &self.writes
    }

    /// Validate every staged write before any of them is applied
    pub fn validate(&self) -> Result<()> {
        self.writes.iter().try_for_each(DocumentWrite::validate)
    }

    pub fn into_writes(self) -> Vec<DocumentWrite> {
        self.writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_path_display_and_validation() {
        let path = DocumentPath::new("TeamProfile", "ARI_1");
        assert_eq!(path.to_string(), "TeamProfile/ARI_1");
        assert!(path.validate().is_ok());

        assert!(DocumentPath::new("", "x").validate().is_err());
        assert!(DocumentPath::new("gameLogs", "").validate().is_err());
        assert!(DocumentPath::new("gameLogs", "a/b").validate().is_err());
    }

    #[test]
    fn test_replace_drops_existing_fields() {
        let write = DocumentWrite::replace(
            DocumentPath::new("c", "d"),
            object(json!({ "a": 1 })),
        );
        let existing = object(json!({ "a": 0, "b": 2 }));

        let doc = write.apply(Some(existing), Utc::now());
        assert_eq!(Value::Object(doc), json!({ "a": 1 }));
    }

    #[test]
    fn test_merge_keeps_unrelated_fields() {
        let write = DocumentWrite::merge(
            DocumentPath::new("c", "d"),
            object(json!({ "a": 1, "nested": { "x": 1 } })),
        );
        let existing = object(json!({ "a": 0, "b": 2, "nested": { "y": 2 } }));

        let doc = write.apply(Some(existing), Utc::now());
        // Shallow: nested objects are replaced, not merged
        assert_eq!(Value::Object(doc), json!({ "a": 1, "b": 2, "nested": { "x": 1 } }));
    }

    #[test]
    fn test_server_timestamp_is_filled() {
        let now = Utc::now();
        let write = DocumentWrite::replace(DocumentPath::new("c", "d"), Document::new())
            .with_server_timestamp("lastUpdated");

        let doc = write.apply(None, now);
        assert_eq!(doc.get("lastUpdated"), Some(&Value::String(now.to_rfc3339())));
    }

    #[test]
    fn test_batch_validation_checks_every_write() {
        let mut batch = WriteBatch::new();
        batch
            .set(DocumentWrite::merge(DocumentPath::new("c", "ok"), Document::new()))
            .set(DocumentWrite::merge(DocumentPath::new("c", ""), Document::new()));

        assert_eq!(batch.len(), 2);
        assert!(batch.validate().is_err());
    }
}
