//! In-memory transport for tests.

use crate::client::transport::Transport;
use crate::error::Result;
use serde_json::Value;
use std::sync::Mutex;

type Handler = Box<dyn Fn(&str, Option<&Value>) -> Result<Value> + Send + Sync>;

/// A request seen by [`FakeTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub endpoint: String,
    pub body: Option<Value>,
}

/// Answers every request with `handler(endpoint, body)` and records it.
pub struct FakeTransport {
    handler: Handler,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, Option<&Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, endpoint: &str, body: Option<&Value>) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            endpoint: endpoint.to_string(),
            body: body.cloned(),
        });
    }
}

impl Transport for FakeTransport {
    async fn get(&self, endpoint: &str) -> Result<Value> {
        self.record("GET", endpoint, None);
        (self.handler)(endpoint, None)
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.record("POST", endpoint, Some(body));
        (self.handler)(endpoint, Some(body))
    }
}
