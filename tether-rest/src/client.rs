//! Client executing one payload with retry-on-timeout.

use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::{Payload, PayloadMethod, RETRY_DELAY, Response, RestError, Result, Transport};

/// Executes a single payload against the API.
///
/// A client is built for one call and consumed by [`execute`](Self::execute).
/// Only a `408 Request Timeout` is retried, after a fixed delay, until the
/// attempt limit is used up. Every other non-success status is returned as
/// [`RestError::RequestFailed`] straight away.
pub struct Client {
    transport: Arc<dyn Transport>,
    payload: Payload,
    api_url: String,
    request_attempts_limit: u32,
    request_attempts: u32,
    retry_delay: Duration,
}

impl Client {
    /// Create a client for `payload`, taking the attempt limit from the payload.
    pub fn new(
        transport: Arc<dyn Transport>,
        payload: Payload,
        api_url: impl Into<String>,
    ) -> Result<Self> {
        let api_url = api_url.into();
        if api_url.trim().is_empty() {
            return Err(RestError::ApiUrlMissing);
        }

        Ok(Self {
            transport,
            request_attempts_limit: payload.request_attempts_limit(),
            payload,
            api_url,
            request_attempts: 0,
            retry_delay: RETRY_DELAY,
        })
    }

    /// Override the maximum number of timeout retries.
    pub fn with_request_attempts_limit(mut self, limit: u32) -> Self {
        self.request_attempts_limit = limit;
        self
    }

    /// Override the delay before each retry.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// The payload this client dispatches.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The maximum number of timeout retries.
    pub fn request_attempts_limit(&self) -> u32 {
        self.request_attempts_limit
    }

    /// The full request URL: the API URL joined with the endpoint and query.
    pub fn request_url(&self) -> Result<String> {
        let endpoint = self.payload.endpoint_with_query_parameters()?;
        Ok(format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        ))
    }

    /// Dispatch the payload, retrying while the service reports a timeout.
    pub async fn execute(mut self) -> Result<Response> {
        loop {
            let response = self.dispatch().await?;

            if response.is_success() {
                return Ok(response);
            }

            if !response.is_request_timeout() {
                return Err(RestError::RequestFailed {
                    payload: self.payload.type_name().to_string(),
                    status: response.status().as_u16(),
                    body: response.text(),
                });
            }

            if self.request_attempts >= self.request_attempts_limit {
                return Err(RestError::RequestAttemptLimitReached {
                    payload: self.payload.type_name().to_string(),
                    attempts: self.request_attempts,
                });
            }

            debug!(
                payload = self.payload.type_name(),
                attempt = self.request_attempts + 1,
                limit = self.request_attempts_limit,
                delay = ?self.retry_delay,
                "Request timed out, retrying"
            );

            tokio::time::sleep(self.retry_delay).await;
            self.request_attempts += 1;
        }
    }

    async fn dispatch(&self) -> Result<Response> {
        let method = self.payload.payload_method()?;
        let url = self.request_url()?;
        let headers = self.header_map()?;

        debug!(
            payload = self.payload.type_name(),
            method = %method,
            url = %url,
            attempt = self.request_attempts,
            "Dispatching request"
        );

        match method {
            PayloadMethod::Get => self.transport.get(&url, &headers).await,
            PayloadMethod::Post => {
                self.transport
                    .post(&url, &headers, self.payload.body())
                    .await
            }
            PayloadMethod::Put => {
                self.transport
                    .put(&url, &headers, self.payload.body())
                    .await
            }
        }
    }

    fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in self.payload.headers() {
            let header_name = HeaderName::try_from(name.as_str())
                .map_err(|_| RestError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::try_from(value.as_str())
                .map_err(|_| RestError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PayloadKind;
    use async_trait::async_trait;
    use http::StatusCode;
    use serde_json::{Map, Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed list of statuses and records each call.
    struct Scripted {
        statuses: Mutex<VecDeque<StatusCode>>,
        calls: Mutex<Vec<(String, String, Option<Map<String, Value>>)>>,
    }

    impl Scripted {
        fn new(statuses: &[u16]) -> Arc<Self> {
            Arc::new(Self {
                statuses: Mutex::new(
                    statuses
                        .iter()
                        .map(|s| StatusCode::from_u16(*s).unwrap())
                        .collect(),
                ),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, String, Option<Map<String, Value>>)> {
            self.calls.lock().unwrap().clone()
        }

        fn reply(&self, verb: &str, url: &str, body: Option<&Map<String, Value>>) -> Response {
            self.calls
                .lock()
                .unwrap()
                .push((verb.to_string(), url.to_string(), body.cloned()));
            let status = self
                .statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(StatusCode::OK);
            Response::new(status, r#"{"error":"x"}"#)
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn get(&self, url: &str, _headers: &HeaderMap) -> Result<Response> {
            Ok(self.reply("GET", url, None))
        }

        async fn post(
            &self,
            url: &str,
            _headers: &HeaderMap,
            body: &Map<String, Value>,
        ) -> Result<Response> {
            Ok(self.reply("POST", url, Some(body)))
        }

        async fn put(
            &self,
            url: &str,
            _headers: &HeaderMap,
            body: &Map<String, Value>,
        ) -> Result<Response> {
            Ok(self.reply("PUT", url, Some(body)))
        }
    }

    struct Kind(&'static str, &'static str);

    impl PayloadKind for Kind {
        fn endpoint_template(&self) -> &str {
            self.0
        }

        fn method(&self) -> &str {
            self.1
        }
    }

    fn client(transport: &Arc<Scripted>, method: &'static str, limit: u32) -> Client {
        let mut payload = Payload::new(Kind("/orders", method));
        payload.set_request_attempts_limit(limit);
        Client::new(transport.clone(), payload, "https://api.example.com/").unwrap()
    }

    #[test]
    fn test_missing_api_url() {
        let transport = Scripted::new(&[]);
        let result = Client::new(transport, Payload::new(Kind("/orders", "GET")), " ");
        assert!(matches!(result, Err(RestError::ApiUrlMissing)));
    }

    #[test]
    fn test_request_url_joins_single_slash() {
        let transport = Scripted::new(&[]);
        let mut payload = Payload::new(Kind("/orders", "GET"));
        payload.set_query_parameters(json!({"page": 1}).as_object().cloned().unwrap());

        let client = Client::new(transport, payload, "https://api.example.com/v1///").unwrap();
        assert_eq!(
            client.request_url().unwrap(),
            "https://api.example.com/v1/orders?page=1"
        );
    }

    #[tokio::test]
    async fn test_success_returns_response() {
        let transport = Scripted::new(&[200]);
        let response = client(&transport, "GET", 1).execute().await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            transport.calls(),
            vec![("GET".to_string(), "https://api.example.com/orders".to_string(), None)]
        );
    }

    #[tokio::test]
    async fn test_post_and_put_send_body() {
        let body = json!({"sku": "A1"}).as_object().cloned().unwrap();

        for verb in ["POST", "put"] {
            let transport = Scripted::new(&[201]);
            let mut client = client(&transport, verb, 1);
            client.payload.set_body(body.clone());
            client.execute().await.unwrap();

            let calls = transport.calls();
            assert_eq!(calls[0].0, verb.to_uppercase());
            assert_eq!(calls[0].2, Some(body.clone()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_retried_up_to_limit() {
        let transport = Scripted::new(&[408, 408, 408, 200]);
        let started = tokio::time::Instant::now();

        let response = client(&transport, "GET", 3).execute().await.unwrap();

        assert!(response.is_success());
        assert_eq!(transport.calls().len(), 4);
        let elapsed = started.elapsed();
        assert!(elapsed >= RETRY_DELAY * 3 && elapsed < RETRY_DELAY * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_beyond_limit() {
        let transport = Scripted::new(&[408, 408, 408, 200]);

        let err = client(&transport, "GET", 2).execute().await.unwrap_err();

        assert!(matches!(err, RestError::RequestAttemptLimitReached { attempts: 2, .. }));
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_limit_never_retries() {
        let transport = Scripted::new(&[408]);

        let err = client(&transport, "GET", 0).execute().await.unwrap_err();

        assert!(matches!(err, RestError::RequestAttemptLimitReached { attempts: 0, .. }));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_retry_delay() {
        let transport = Scripted::new(&[408, 200]);
        let started = tokio::time::Instant::now();

        client(&transport, "GET", 1)
            .with_retry_delay(Duration::from_millis(250))
            .execute()
            .await
            .unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(250) && elapsed < RETRY_DELAY);
    }

    #[tokio::test]
    async fn test_server_error_not_retried() {
        let transport = Scripted::new(&[500, 200]);

        let err = client(&transport, "GET", 5).execute().await.unwrap_err();

        match err {
            RestError::RequestFailed {
                payload,
                status,
                body,
            } => {
                assert!(payload.ends_with("Kind"));
                assert_eq!(status, 500);
                assert_eq!(body, r#"{"error":"x"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_method_sends_nothing() {
        let transport = Scripted::new(&[200]);

        let err = client(&transport, "delete", 1).execute().await.unwrap_err();

        assert!(matches!(err, RestError::MethodUnsupported { .. }));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_header_sends_nothing() {
        let transport = Scripted::new(&[200]);
        let mut client = client(&transport, "GET", 1);
        client.payload.add_header("X-Bad", "line\nbreak");

        let err = client.execute().await.unwrap_err();

        assert!(matches!(err, RestError::InvalidHeader(ref name) if name == "X-Bad"));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_limit_override() {
        let transport = Scripted::new(&[]);
        let client = client(&transport, "GET", 1).with_request_attempts_limit(9);
        assert_eq!(client.request_attempts_limit(), 9);
    }
}
