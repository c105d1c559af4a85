//! Recording enrichment provider

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anirelay_core::{EnrichmentProvider, UpstreamError, UpstreamResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// One search the provider served
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub title: String,
    pub started: Instant,
    pub finished: Instant,
}

/// Provider answering title searches from a script
///
/// Unscripted titles match nothing. Every call is timestamped so tests can
/// check how the queue spaced them.
pub struct FakeProvider {
    searches: Mutex<HashMap<String, UpstreamResult<Value>>>,
    top: Mutex<Value>,
    latency: Duration,
    calls: Mutex<Vec<ProviderCall>>,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Self::with_latency(Duration::ZERO)
    }

    /// Provider that takes `latency` to answer each search
    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            searches: Mutex::new(HashMap::new()),
            top: Mutex::new(json!({ "data": [] })),
            latency,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Answer searches for `title` with `body`
    pub fn on_search(&self, title: &str, body: Value) {
        self.searches
            .lock()
            .unwrap()
            .insert(title.to_string(), Ok(body));
    }

    /// Throttle searches for `title`
    pub fn throttle(&self, title: &str) {
        self.searches
            .lock()
            .unwrap()
            .insert(title.to_string(), Err(UpstreamError::RateLimited));
    }

    pub fn set_top(&self, body: Value) {
        *self.top.lock().unwrap() = body;
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl EnrichmentProvider for FakeProvider {
    async fn search_anime(
        &self,
        title: &str,
        _cancel: &CancellationToken,
    ) -> UpstreamResult<Value> {
        let started = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let answer = match self.searches.lock().unwrap().get(title) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(_)) => Err(UpstreamError::RateLimited),
            None => Ok(json!({ "data": [] })),
        };

        self.calls.lock().unwrap().push(ProviderCall {
            title: title.to_string(),
            started,
            finished: Instant::now(),
        });
        answer
    }

    async fn top_anime(&self, _limit: u32, _cancel: &CancellationToken) -> UpstreamResult<Value> {
        Ok(self.top.lock().unwrap().clone())
    }
}
