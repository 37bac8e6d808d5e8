//! Per-call request parts and the fluent request builder.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Handler, PayloadType, Response, RestError, Result, RouteParameter};

/// Call-specific parts applied on top of a freshly built payload.
///
/// All parts start empty. Route parameters are applied in order; since each
/// one re-bases on the endpoint template, only the last is visible.
#[derive(Debug, Clone, Default)]
pub struct Call {
    /// Headers applied after the handler's auth headers.
    pub headers: Vec<(String, String)>,
    /// Route parameters, in application order.
    pub route_parameters: Vec<RouteParameter>,
    /// Query parameters.
    pub query_parameters: Map<String, Value>,
    /// Request body, sent with POST and PUT.
    pub body: Map<String, Value>,
}

impl Call {
    /// Create an empty call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a route parameter.
    pub fn route_parameter(mut self, parameter: impl Into<RouteParameter>) -> Self {
        self.route_parameters.push(parameter.into());
        self
    }

    /// Set one query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_parameters.insert(key.into(), value.into());
        self
    }

    /// Replace all query parameters.
    pub fn query_parameters(mut self, query_parameters: Map<String, Value>) -> Self {
        self.query_parameters = query_parameters;
        self
    }

    /// Replace the body.
    pub fn body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self
    }
}

/// Fluent builder for one call through a [`Handler`].
#[must_use = "a request does nothing until it is sent"]
pub struct RequestBuilder<'a> {
    handler: &'a Handler,
    payload_type: PayloadType,
    call: Call,
    error: Option<RestError>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(handler: &'a Handler, payload_type: PayloadType) -> Self {
        Self {
            handler,
            payload_type,
            call: Call::new(),
            error: None,
        }
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.call = self.call.header(name, value);
        self
    }

    /// Set bearer authentication.
    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    /// Add a route parameter.
    pub fn route_parameter(mut self, parameter: impl Into<RouteParameter>) -> Self {
        self.call = self.call.route_parameter(parameter);
        self
    }

    /// Set one query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.call = self.call.query(key, value);
        self
    }

    /// Replace the body.
    pub fn body(mut self, body: Map<String, Value>) -> Self {
        self.call = self.call.body(body);
        self
    }

    /// Replace the body with a serializable value.
    ///
    /// The value must serialize to a JSON object; otherwise [`send`](Self::send)
    /// fails with [`RestError::Json`] without dispatching anything.
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(Value::Object(map)) => self.call.body = map,
            Ok(other) => {
                self.error = Some(RestError::Json(format!(
                    "request body must be a JSON object, got {other}"
                )));
            }
            Err(e) => self.error = Some(RestError::Json(e.to_string())),
        }
        self
    }

    /// The parts assembled so far.
    pub fn call(&self) -> &Call {
        &self.call
    }

    /// Send the request.
    pub async fn send(self) -> Result<Response> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.handler.run(&self.payload_type, self.call).await
    }
}
