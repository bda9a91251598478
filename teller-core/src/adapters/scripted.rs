//! Scripted in-process transport
//!
//! Replies to requests from a per-route script instead of the network and
//! records every request it sees. Used by tests and offline demos.
//!
//! Routes are keyed by method and URL path (query string ignored). Each
//! route holds a queue of replies; the last reply repeats once the queue is
//! down to one entry. A route can also be held, which parks its requests
//! until released, so callers can observe in-flight states.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::watch;

use crate::ports::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

type Route = (Method, String);

#[derive(Debug, Clone)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<Route, VecDeque<Reply>>>,
    gates: Mutex<HashMap<Route, watch::Sender<bool>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queue a JSON reply
    pub fn respond_json(&self, method: Method, path: &str, status: u16, body: JsonValue) {
        self.push(method, path, Reply::Respond(HttpResponse::new(status, body.to_string())));
    }

    /// Queue a raw text reply
    pub fn respond_text(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(method, path, Reply::Respond(HttpResponse::new(status, body)));
    }

    /// Queue a transport failure
    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Reply::Fail(message.to_string()));
    }

    /// Park requests to this route until [`release`](Self::release) is called
    pub fn hold(&self, method: Method, path: &str) {
        let mut gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
        let (tx, _rx) = watch::channel(false);
        gates.insert((method, path.to_string()), tx);
    }

    /// Let parked and future requests to this route through
    pub fn release(&self, method: Method, path: &str) {
        let mut gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(gate) = gates.remove(&(method, path.to_string())) {
            gate.send_replace(true);
        }
    }

    /// Every request seen so far, in arrival order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of requests seen for a path (any method)
    pub fn request_count(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|r| r.url.path() == path)
            .count()
    }

    /// Total number of requests seen
    pub fn total_requests(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn next_reply(&self, route: &Route) -> Option<Reply> {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let queue = routes.get_mut(route)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let route = (request.method, request.url.path().to_string());

        let gate = {
            let gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
            gates.get(&route).map(|tx| tx.subscribe())
        };

        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        if let Some(mut gate) = gate {
            // Sender dropped without release means the gate is gone; carry on
            let _ = gate.wait_for(|open| *open).await;
        }

        match self.next_reply(&route) {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(TransportError(message)),
            None => Ok(HttpResponse::new(404, r#"{"detail": "Not Found"}"#)),
        }
    }
}
