//! Error types for the fetcher

use document_store::StoreError;
use thiserror::Error;

/// Any provider failure: transport, timeout, non-2xx status or undecodable body.
/// The underlying cause is logged where it happens and never carried further.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Failed to fetch data")]
pub struct FetchError;

/// Errors that can occur while refreshing stored provider data
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Unexpected provider payload: {0}")]
    Payload(String),
}

impl RefreshError {
    pub fn payload(msg: impl Into<String>) -> Self {
        Self::Payload(msg.into())
    }
}
