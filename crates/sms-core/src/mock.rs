//! Recording transport for adapter tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Transport that records every request and replays queued responses.
///
/// When the queue is empty it answers with `fallback`, which defaults to an
/// empty `200`.
#[derive(Debug, Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug)]
struct MockState {
    requests: Vec<HttpRequest>,
    queued: VecDeque<Result<HttpResponse, TransportError>>,
    fallback: Result<HttpResponse, TransportError>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::replying(HttpResponse::new(200, ""))
    }

    /// Every call answers with `response`.
    pub fn replying(response: HttpResponse) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockState {
                requests: Vec::new(),
                queued: VecDeque::new(),
                fallback: Ok(response),
            })),
        }
    }

    /// Every call fails with `error`.
    pub fn failing(error: TransportError) -> Self {
        let mock = Self::new();
        mock.state().fallback = Err(error);
        mock
    }

    /// Queue a one-shot reply ahead of the fallback.
    pub fn push(&self, reply: Result<HttpResponse, TransportError>) -> &Self {
        self.state().queued.push_back(reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.state().requests.len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state().requests.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut state = self.state();
        state.requests.push(request);
        match state.queued.pop_front() {
            Some(reply) => reply,
            None => state.fallback.clone(),
        }
    }
}
