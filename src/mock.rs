//! Test doubles for deterministic testing.
//!
//! [`MockTransport`] stands in for the request pipeline: it serves scripted
//! replies (optionally after a delay, measured on the tokio clock so paused
//! time works) and records every request it sees. The gate doubles record
//! prompts, alerts and navigation.
//!
//! ```rust
//! use folio::mock::MockTransport;
//! use serde_json::json;
//!
//! let mock = MockTransport::new();
//! mock.respond("GET", "/articles/", json!([]));
//! ```

use reqwest::Method;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use async_trait::async_trait;

use crate::errors::RequestError;
use crate::gate::{ConfirmationGate, Navigator, Notifier, Route};
use crate::pipeline::{ApiRequest, Transport};

/// A scripted reply.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub result: Result<Value, RequestError>,
    pub delay: Duration,
}

impl MockReply {
    pub fn ok(body: Value) -> Self {
        Self {
            result: Ok(body),
            delay: Duration::ZERO,
        }
    }

    pub fn err(err: RequestError) -> Self {
        Self {
            result: Err(err),
            delay: Duration::ZERO,
        }
    }

    /// A failed response with the given status and body.
    pub fn status(status: u16, body: Value) -> Self {
        Self::err(RequestError::from_response(status, &body))
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = Box<dyn Fn(&ApiRequest) -> MockReply + Send + Sync>;

struct MockRoute {
    method: Method,
    path: String,
    responder: Responder,
}

/// A request as seen by the mock, with the tokio time it arrived.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request: ApiRequest,
    pub at: Instant,
}

/// Scripted, recording [`Transport`].
///
/// The most recently registered matching route wins. Unmatched requests get
/// an empty (`null`) success body.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<MockRoute>>,
    log: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `method path` with `body`.
    pub fn respond(&self, method: &str, path: &str, body: Value) {
        self.reply(method, path, MockReply::ok(body));
    }

    /// Reply to `method path` with a fixed [`MockReply`].
    pub fn reply(&self, method: &str, path: &str, reply: MockReply) {
        self.respond_with(method, path, move |_| reply.clone());
    }

    /// Reply to `method path` with a reply computed from the request.
    pub fn respond_with(
        &self,
        method: &str,
        path: &str,
        responder: impl Fn(&ApiRequest) -> MockReply + Send + Sync + 'static,
    ) {
        let method = Method::from_bytes(method.as_bytes()).unwrap_or(Method::GET);
        self.routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MockRoute {
                method,
                path: path.to_string(),
                responder: Box::new(responder),
            });
    }

    pub fn calls(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.calls().into_iter().map(|c| c.request).collect()
    }

    /// `"METHOD /path/?k=v&k2=v2"` per request, in arrival order.
    pub fn request_lines(&self) -> Vec<String> {
        self.requests().iter().map(request_line).collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn lookup(&self, request: &ApiRequest) -> MockReply {
        let routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        routes
            .iter()
            .rev()
            .find(|r| r.method == request.method && r.path == request.path)
            .map(|r| (r.responder)(request))
            .unwrap_or_else(|| MockReply::ok(Value::Null))
    }
}

pub fn request_line(request: &ApiRequest) -> String {
    let mut line = format!("{} {}", request.method, request.path);
    if !request.params.is_empty() {
        let query: Vec<String> = request
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        line.push('?');
        line.push_str(&query.join("&"));
    }
    line
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, RequestError> {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                request: request.clone(),
                at: Instant::now(),
            });
        let reply = self.lookup(&request);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

/// Gate that gives a fixed answer and records each prompt.
pub struct ScriptedGate {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGate {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ConfirmationGate for ScriptedGate {
    fn confirm(&self, message: &str) -> bool {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
        self.answer
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn alert(&self, message: &str) {
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<(Route, Instant)>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.visits().into_iter().map(|(r, _)| r).collect()
    }

    pub fn visits(&self) -> Vec<(Route, Instant)> {
        self.visits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.visits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((route, Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_latest_route_wins() {
        let mock = MockTransport::new();
        mock.respond("GET", "/x/", json!(1));
        mock.respond("GET", "/x/", json!(2));
        assert_eq!(mock.send(ApiRequest::get("/x/")).await.unwrap(), json!(2));
    }

    #[tokio::test]
    async fn test_unmatched_is_null() {
        let mock = MockTransport::new();
        assert_eq!(
            mock.send(ApiRequest::delete("/y/")).await.unwrap(),
            Value::Null
        );
        assert_eq!(mock.request_lines(), vec!["DELETE /y/"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_uses_tokio_clock() {
        let mock = MockTransport::new();
        let slow = MockReply::ok(json!(1)).after(Duration::from_millis(300));
        mock.reply("GET", "/slow/", slow);
        let start = Instant::now();
        mock.send(ApiRequest::get("/slow/")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[test]
    fn test_request_line_includes_params() {
        let params = vec![("search".into(), "a b".into()), ("tags".into(), "x".into())];
        let request = ApiRequest::get("/articles/").with_params(params);
        assert_eq!(request_line(&request), "GET /articles/?search=a b&tags=x");
    }
}
