//! Canned provider for tests

use crate::error::FetchError;
use crate::fetcher::StatsProvider;
use parking_lot::Mutex;
use serde_json::Value;

/// Answers fetches from a list of `(url fragment, response)` rules and records every URL requested
#[derive(Default)]
pub struct StubProvider {
    rules: Vec<(String, Result<Value, FetchError>)>,
    requests: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `body` to any URL containing `fragment`
    pub fn respond(mut self, fragment: impl Into<String>, body: Value) -> Self {
        self.rules.push((fragment.into(), Ok(body)));
        self
    }

    /// Fail any URL containing `fragment`
    pub fn fail(mut self, fragment: impl Into<String>) -> Self {
        self.rules.push((fragment.into(), Err(FetchError)));
        self
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl StatsProvider for StubProvider {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        self.requests.lock().push(url.to_string());

        self.rules
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or(Err(FetchError))
    }
}
