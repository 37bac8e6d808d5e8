//! HTTP response wrapper.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;

use crate::{RestError, Result};

/// Response returned by a [`Transport`](crate::Transport).
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: Option<url::Url>,
}

impl Response {
    /// Create a response from its parts.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            url: None,
        }
    }

    /// Create a response with a JSON body.
    pub fn json_body(status: StatusCode, body: &serde_json::Value) -> Self {
        let mut response = Self::new(status, body.to_string());
        response.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }

    /// Create a response from a reqwest response.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            body,
            url: Some(url),
        })
    }

    /// Add a header to the response.
    ///
    /// Fails with [`RestError::InvalidHeader`] when the name or value is not
    /// a valid HTTP header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let header_name =
            HeaderName::try_from(name).map_err(|_| RestError::InvalidHeader(name.to_string()))?;
        let header_value =
            HeaderValue::try_from(value).map_err(|_| RestError::InvalidHeader(name.to_string()))?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Set the URL the response was received from.
    pub fn with_url(mut self, url: url::Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if the remote service reported a request timeout (408).
    pub fn is_request_timeout(&self) -> bool {
        self.status == StatusCode::REQUEST_TIMEOUT
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the response URL, when the transport knows it.
    pub fn url(&self) -> Option<&url::Url> {
        self.url.as_ref()
    }

    /// Get the raw response body.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response and return the raw body.
    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// Get the response body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| RestError::Json(e.to_string()))
    }

    /// Get the content type if available.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body() {
        let response = Response::json_body(StatusCode::OK, &json!({"id": 7}));

        assert!(response.is_success());
        assert_eq!(response.content_type(), Some("application/json"));
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["id"], 7);
    }

    #[test]
    fn test_timeout_classification() {
        let response = Response::new(StatusCode::REQUEST_TIMEOUT, "");
        assert!(response.is_request_timeout());
        assert!(!response.is_success());
    }

    #[test]
    fn test_text_and_headers() {
        let response = Response::new(StatusCode::INTERNAL_SERVER_ERROR, "boom")
            .with_header("x-request-id", "abc")
            .unwrap();

        assert_eq!(response.text(), "boom");
        assert_eq!(response.header("X-Request-Id"), Some("abc"));
        assert!(response.url().is_none());
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = Response::new(StatusCode::OK, "")
            .with_header("bad header", "abc")
            .unwrap_err();
        assert!(matches!(err, RestError::InvalidHeader(ref name) if name == "bad header"));

        let err = Response::new(StatusCode::OK, "")
            .with_header("x-note", "line\nbreak")
            .unwrap_err();
        assert!(matches!(err, RestError::InvalidHeader(ref name) if name == "x-note"));
    }

    #[test]
    fn test_invalid_json() {
        let response = Response::new(StatusCode::OK, "not json");
        assert!(matches!(response.json::<serde_json::Value>(), Err(RestError::Json(_))));
    }
}
