//! # Tether REST
//!
//! A structured REST request pipeline: a declarative payload describes one
//! API call, a client turns it into an HTTP request and retries it when the
//! remote service answers `408 Request Timeout`.
//!
//! ## Pipeline
//!
//! - **Payload**: endpoint template and method from a [`PayloadKind`], plus
//!   headers, body, query and route parameters
//! - **Factory**: resolves a descriptor to a registered kind via a
//!   [`PayloadRegistry`]
//! - **Client**: dispatches through a [`Transport`], classifies the response
//!   and retries timeouts with a fixed delay
//! - **Handler**: long-lived façade applying auth headers and per-call parts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tether_rest::{Handler, HandlerConfig, PayloadKind, PayloadMethod, PayloadRegistry};
//!
//! #[derive(Default)]
//! struct CreateOrder;
//!
//! impl PayloadKind for CreateOrder {
//!     fn endpoint_template(&self) -> &str {
//!         "/orders"
//!     }
//!
//!     fn method(&self) -> &str {
//!         PayloadMethod::Post.as_str()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HandlerConfig::builder("https://api.example.com")
//!         .auth_header("X-Api-Key", "secret")
//!         .request_attempts_limit(3)
//!         .build();
//!     let registry = PayloadRegistry::new().with::<CreateOrder>("orders.create");
//!     let handler = Handler::with_reqwest(config, registry, &Default::default())?;
//!
//!     let response = handler
//!         .request("orders.create")
//!         .json(&serde_json::json!({"item": "widget", "quantity": 5}))
//!         .send()
//!         .await?;
//!
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod handler;
mod payload;
mod query;
mod registry;
mod request;
mod response;
mod transport;

pub use client::Client;
pub use config::{
    HandlerConfig, HandlerConfigBuilder, RETRY_DELAY, TransportConfig, TransportConfigBuilder,
};
pub use error::{RestError, Result};
pub use handler::Handler;
pub use payload::{
    APPLICATION_JSON, CONTENT_TYPE, Payload, PayloadKind, PayloadMethod, RouteParameter,
};
pub use query::encode_query;
pub use registry::{PayloadDescriptor, PayloadFactory, PayloadRegistry, PayloadType};
pub use request::{Call, RequestBuilder};
pub use response::Response;
pub use transport::{ReqwestTransport, Transport};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, StatusCode};
pub use serde_json::{Map, Value};

/// Prelude for common imports.
///
/// ```
/// use tether_rest::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::Client;
    pub use crate::config::{HandlerConfig, TransportConfig};
    pub use crate::error::{RestError, Result};
    pub use crate::handler::Handler;
    pub use crate::payload::{Payload, PayloadKind, PayloadMethod, RouteParameter};
    pub use crate::registry::{PayloadDescriptor, PayloadFactory, PayloadRegistry, PayloadType};
    pub use crate::request::Call;
    pub use crate::response::Response;
    pub use crate::transport::{ReqwestTransport, Transport};
    pub use http::StatusCode;
}
