//! Testing utilities for Tether.
//!
//! [`MockTransport`] replays scripted responses and records every request
//! the client dispatches, so pipeline behavior can be asserted without a
//! network.
//!
//! ```
//! use std::sync::Arc;
//! use tether_rest::{Call, Handler, HandlerConfig, PayloadKind, PayloadRegistry};
//! use tether_testing::MockTransport;
//!
//! #[derive(Default)]
//! struct Ping;
//!
//! impl PayloadKind for Ping {
//!     fn endpoint_template(&self) -> &str { "/ping" }
//!     fn method(&self) -> &str { "GET" }
//! }
//!
//! # tokio_test::block_on(async {
//! let transport = Arc::new(MockTransport::new().with_status(200));
//! let handler = Handler::new(
//!     HandlerConfig::new("https://api.example.com"),
//!     PayloadRegistry::new().with::<Ping>("ping"),
//!     transport.clone(),
//! )
//! .unwrap();
//!
//! handler.run("ping", Call::new()).await.unwrap();
//! assert_eq!(transport.last_request().unwrap().url, "https://api.example.com/ping");
//! # });
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tether_rest::{
    Bytes, HeaderMap, Map, PayloadMethod, Response, Result, StatusCode, Transport, Value,
};

/// A request as seen by the transport.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The dispatched method.
    pub method: PayloadMethod,
    /// The full request URL.
    pub url: String,
    /// The request headers.
    pub headers: HeaderMap,
    /// The JSON body, `None` for GET.
    pub body: Option<Map<String, Value>>,
}

impl RecordedRequest {
    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Transport replaying scripted responses in order.
///
/// Once the script runs out, the fallback response is returned (`200 OK`
/// with an empty body unless set).
#[derive(Clone)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Response>>>,
    fallback: Response,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Response::new(StatusCode::OK, Bytes::new()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a response.
    pub fn with_response(self, response: Response) -> Self {
        self.script.lock().unwrap().push_back(response);
        self
    }

    /// Queue an empty response with the given status.
    pub fn with_status(self, status: u16) -> Self {
        self.with_response(Response::new(status_code(status), Bytes::new()))
    }

    /// Queue the same status `times` times.
    pub fn with_status_times(mut self, status: u16, times: usize) -> Self {
        for _ in 0..times {
            self = self.with_status(status);
        }
        self
    }

    /// Queue a JSON response.
    pub fn with_json(self, status: u16, body: &Value) -> Self {
        self.with_response(Response::json_body(status_code(status), body))
    }

    /// Set the response returned once the script is exhausted.
    pub fn with_fallback(mut self, response: Response) -> Self {
        self.fallback = response;
        self
    }

    /// All recorded requests, in dispatch order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of dispatched requests.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Number of scripted responses not yet returned.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    /// Forget recorded requests.
    pub fn clear(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record(
        &self,
        method: PayloadMethod,
        url: &str,
        headers: &HeaderMap,
        body: Option<&Map<String, Value>>,
    ) -> Response {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            headers: headers.clone(),
            body: body.cloned(),
        });

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Response> {
        Ok(self.record(PayloadMethod::Get, url, headers, None))
    }

    async fn post(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Map<String, Value>,
    ) -> Result<Response> {
        Ok(self.record(PayloadMethod::Post, url, headers, Some(body)))
    }

    async fn put(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Map<String, Value>,
    ) -> Result<Response> {
        Ok(self.record(PayloadMethod::Put, url, headers, Some(body)))
    }
}

fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_fallback() {
        let mock = MockTransport::new().with_status_times(408, 2);
        let headers = HeaderMap::new();

        assert_eq!(mock.get("u", &headers).await.unwrap().status(), 408);
        assert_eq!(mock.get("u", &headers).await.unwrap().status(), 408);
        assert_eq!(mock.remaining(), 0);
        assert_eq!(mock.get("u", &headers).await.unwrap().status(), 200);
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_records_body() {
        let mock = MockTransport::new();
        let mut body = Map::new();
        body.insert("a".to_string(), Value::from(1));

        mock.put("u", &HeaderMap::new(), &body).await.unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, PayloadMethod::Put);
        assert_eq!(request.body, Some(body));

        mock.clear();
        assert_eq!(mock.request_count(), 0);
    }
}
