//! Scripted transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use super::transport::{HttpResponse, HttpTransport, TransportError};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A response with a JSON body.
    Json { status: u16, body: Value },
    /// A response with an arbitrary body.
    Raw { status: u16, body: String },
    /// No response at all.
    NetworkError,
    /// Another reply, delivered after a delay.
    Delayed { delay: Duration, reply: Box<MockReply> },
}

impl MockReply {
    /// 200 with the given JSON body.
    pub fn ok(body: Value) -> Self {
        Self::Json { status: 200, body }
    }

    /// Bare status with an empty JSON object body.
    pub fn status(status: u16) -> Self {
        Self::Json {
            status,
            body: Value::Object(Default::default()),
        }
    }

    /// 200 with a body that is not JSON.
    pub fn garbage() -> Self {
        Self::Raw {
            status: 200,
            body: "<html>maintenance</html>".to_string(),
        }
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Self::Delayed {
            delay,
            reply: Box::new(self),
        }
    }
}

/// A recorded request.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub url: String,
    pub at: Instant,
}

#[derive(Default)]
struct Route {
    queue: VecDeque<MockReply>,
    standing: Option<MockReply>,
}

/// Transport that answers from a per-URL script.
///
/// One-shot replies queued with [`push`](Self::push) are consumed first, then
/// the standing reply set with [`on`](Self::on) answers every further call.
/// Unscripted URLs answer 404.
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<HashMap<String, Route>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the standing reply for `url`.
    pub fn on(&self, url: impl Into<String>, reply: MockReply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.into())
            .or_default()
            .standing = Some(reply);
        self
    }

    /// Queues a one-shot reply for `url`.
    pub fn push(&self, url: impl Into<String>, reply: MockReply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.into())
            .or_default()
            .queue
            .push_back(reply);
        self
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made to `url`.
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.url == url)
            .count()
    }

    /// Instants at which `url` was requested.
    pub fn call_instants(&self, url: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.url == url)
            .map(|c| c.at)
            .collect()
    }

    fn next_reply(&self, url: &str) -> MockReply {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(url) {
            Some(route) => route
                .queue
                .pop_front()
                .or_else(|| route.standing.clone())
                .unwrap_or_else(|| MockReply::status(404)),
            None => MockReply::status(404),
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(MockCall {
            url: url.to_string(),
            at: Instant::now(),
        });

        let mut reply = self.next_reply(url);
        loop {
            match reply {
                MockReply::Delayed { delay, reply: inner } => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
                MockReply::Json { status, body } => {
                    return Ok(HttpResponse {
                        status,
                        body: body.to_string().into_bytes(),
                    })
                }
                MockReply::Raw { status, body } => {
                    return Ok(HttpResponse {
                        status,
                        body: body.into_bytes(),
                    })
                }
                MockReply::NetworkError => {
                    return Err(TransportError::Network("connection refused".to_string()))
                }
            }
        }
    }
}
