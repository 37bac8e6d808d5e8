//! Transport seam between the client and the network.

use async_trait::async_trait;
use http::HeaderMap;
use serde_json::{Map, Value};
use tracing::trace;

use crate::{Response, Result, TransportConfig};

/// Performs the actual HTTP exchange for a [`Client`](crate::Client).
///
/// Implementations return every received response, whatever its status.
/// Classifying the status is the client's job.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a GET request without a body.
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Response>;

    /// Send a POST request with a JSON body.
    async fn post(&self, url: &str, headers: &HeaderMap, body: &Map<String, Value>)
    -> Result<Response>;

    /// Send a PUT request with a JSON body.
    async fn put(&self, url: &str, headers: &HeaderMap, body: &Map<String, Value>)
    -> Result<Response>;
}

/// Transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the given configuration.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.gzip)
            .brotli(config.brotli);

        if config.follow_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::limited(config.max_redirects));
        } else {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }

        Ok(Self {
            inner: builder.build()?,
        })
    }

    /// Wrap an already configured reqwest client.
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Get the underlying reqwest client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        trace!(status = %response.status(), url = %response.url(), "Received HTTP response");
        Response::from_reqwest(response).await
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Response> {
        self.send(self.inner.get(url).headers(headers.clone())).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Map<String, Value>,
    ) -> Result<Response> {
        self.send(self.inner.post(url).headers(headers.clone()).json(body))
            .await
    }

    async fn put(
        &self,
        url: &str,
        headers: &HeaderMap,
        body: &Map<String, Value>,
    ) -> Result<Response> {
        self.send(self.inner.put(url).headers(headers.clone()).json(body))
            .await
    }
}
