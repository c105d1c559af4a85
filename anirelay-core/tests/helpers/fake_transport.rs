//! Scripted HTTP transport

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use anirelay_core::{HttpTransport, UpstreamError, UpstreamResponse, UpstreamResult};
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
enum Scripted {
    Respond(u16, Value),
    Fail(String),
}

/// Transport answering from per-URL scripts and recording every request
///
/// Each URL holds a queue of answers; the last answer repeats once the queue
/// is down to one. Unscripted URLs answer HTTP 404 with a null body.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, url: &str, answer: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(answer);
    }

    /// Answer `url` with a JSON body and status
    pub fn respond(&self, url: &str, status: u16, body: Value) {
        self.push(url, Scripted::Respond(status, body));
    }

    /// Answer `url` with HTTP 200 and `body`
    pub fn ok(&self, url: &str, body: Value) {
        self.respond(url, 200, body);
    }

    /// Fail `url` at the network level
    pub fn fail(&self, url: &str, message: &str) {
        self.push(url, Scripted::Fail(message.to_string()));
    }

    /// Every URL requested, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// How many times `url` was requested
    pub fn count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|requested| requested.as_str() == url)
            .count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get_json(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> UpstreamResult<UpstreamResponse> {
        if cancel.is_cancelled() {
            return Err(UpstreamError::Cancelled);
        }
        self.requests.lock().unwrap().push(url.to_string());

        let answer = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match answer {
            Some(Scripted::Respond(status, body)) => Ok(UpstreamResponse::new(status, body)),
            Some(Scripted::Fail(message)) => Err(UpstreamError::Network(message)),
            None => Ok(UpstreamResponse::new(404, Value::Null)),
        }
    }
}
