//! Payload abstraction.
//!
//! A [`PayloadKind`] describes the fixed shape of one API call: the endpoint
//! template and the HTTP method. A [`Payload`] wraps a kind together with the
//! mutable request state (headers, body, query and route parameters) and is
//! built fresh for every call.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tether_config::DEFAULT_REQUEST_ATTEMPTS_LIMIT;

use crate::query::encode_query;
use crate::{RestError, Result};

/// The header name for the request content type.
pub const CONTENT_TYPE: &str = "Content-Type";

/// The JSON MIME type, sent by default with every payload.
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP methods a payload can be dispatched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadMethod {
    /// GET, sent without a body.
    Get,
    /// POST with a JSON body.
    Post,
    /// PUT with a JSON body.
    Put,
}

impl PayloadMethod {
    /// Canonical upper-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }

    /// Parse a method name, ignoring case.
    pub fn parse(method: &str) -> Option<Self> {
        [Self::Get, Self::Post, Self::Put]
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(method.trim()))
    }

    /// Whether the payload body is sent with this method.
    pub fn sends_body(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for PayloadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PayloadMethod> for http::Method {
    fn from(method: PayloadMethod) -> Self {
        match method {
            PayloadMethod::Get => http::Method::GET,
            PayloadMethod::Post => http::Method::POST,
            PayloadMethod::Put => http::Method::PUT,
        }
    }
}

/// The fixed shape of one kind of API call.
///
/// Both methods must be deterministic: the endpoint template is fetched again
/// every time a route parameter is added.
///
/// ```
/// use tether_rest::{PayloadKind, PayloadMethod};
///
/// #[derive(Default)]
/// struct ShowUser;
///
/// impl PayloadKind for ShowUser {
///     fn endpoint_template(&self) -> &str {
///         "/users"
///     }
///
///     fn method(&self) -> &str {
///         PayloadMethod::Get.as_str()
///     }
/// }
/// ```
pub trait PayloadKind: Send + Sync + 'static {
    /// The endpoint path, relative to the API URL.
    fn endpoint_template(&self) -> &str;

    /// The HTTP method name.
    fn method(&self) -> &str;

    /// Headers every payload of this kind starts with.
    fn default_headers(&self) -> Vec<(String, String)> {
        vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())]
    }
}

/// A value appended to the endpoint as a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteParameter(String);

impl RouteParameter {
    /// Create a route parameter from anything with a textual form.
    pub fn new(value: impl fmt::Display) -> Self {
        Self(value.to_string())
    }

    /// The parameter as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reject parameters with nothing left once separators are stripped.
    pub fn validate(&self) -> Result<()> {
        if self.0.trim_matches('/').trim().is_empty() {
            return Err(RestError::InvalidRouteParameter);
        }
        Ok(())
    }
}

impl fmt::Display for RouteParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteParameter {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RouteParameter {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for RouteParameter {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

macro_rules! route_parameter_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RouteParameter {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

route_parameter_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Request state for one logical API call.
pub struct Payload {
    kind: Box<dyn PayloadKind>,
    type_name: &'static str,
    endpoint: String,
    method: String,
    headers: BTreeMap<String, String>,
    body: Map<String, Value>,
    query_parameters: Map<String, Value>,
    request_attempts_limit: u32,
}

impl Payload {
    /// Create a payload, fixing endpoint, method and default headers from the kind.
    pub fn new<K: PayloadKind>(kind: K) -> Self {
        let endpoint = kind.endpoint_template().to_string();
        let method = kind.method().to_string();

        let mut payload = Self {
            type_name: std::any::type_name::<K>(),
            kind: Box::new(kind),
            endpoint,
            method,
            headers: BTreeMap::new(),
            body: Map::new(),
            query_parameters: Map::new(),
            request_attempts_limit: DEFAULT_REQUEST_ATTEMPTS_LIMIT,
        };

        for (key, value) in payload.kind.default_headers() {
            payload.add_header(key, value);
        }

        tracing::trace!(payload = payload.type_name, "Payload constructed");
        payload
    }

    /// Fully-qualified type name of the payload kind.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The resolved endpoint path.
    pub fn endpoint(&self) -> Result<&str> {
        if self.endpoint.trim().is_empty() {
            return Err(RestError::EndpointMissing {
                payload: self.type_name.to_string(),
            });
        }
        Ok(&self.endpoint)
    }

    /// The resolved HTTP method name.
    pub fn method(&self) -> Result<&str> {
        if self.method.trim().is_empty() {
            return Err(RestError::MethodMissing {
                payload: self.type_name.to_string(),
            });
        }
        Ok(&self.method)
    }

    /// The resolved method, checked against the supported set.
    pub fn payload_method(&self) -> Result<PayloadMethod> {
        let method = self.method()?;
        PayloadMethod::parse(method).ok_or_else(|| RestError::MethodUnsupported {
            payload: self.type_name.to_string(),
            method: method.to_string(),
        })
    }

    /// The endpoint followed by the encoded query string, if any.
    pub fn endpoint_with_query_parameters(&self) -> Result<String> {
        let endpoint = self.endpoint()?;
        if self.query_parameters.is_empty() {
            return Ok(endpoint.to_string());
        }
        Ok(format!("{}?{}", endpoint, encode_query(&self.query_parameters)))
    }

    /// Re-derive the endpoint as the kind's template joined with `parameter`.
    ///
    /// The join always starts from the template, so only the most recent
    /// parameter is visible in the endpoint.
    pub fn add_route_parameter(&mut self, parameter: impl Into<RouteParameter>) -> Result<()> {
        let parameter = parameter.into();
        parameter.validate()?;

        let template = self.kind.endpoint_template();
        if template.trim().is_empty() {
            return Err(RestError::EndpointMissing {
                payload: self.type_name.to_string(),
            });
        }

        self.endpoint = format!(
            "{}/{}",
            template.trim_end_matches('/'),
            parameter.as_str().trim_start_matches('/')
        );
        Ok(())
    }

    /// Current request headers.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Get a header value, ignoring the case of the name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Add or replace a header. Names compare case-insensitively.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.headers.retain(|name, _| !name.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
    }

    /// The request body.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Replace the request body.
    pub fn set_body(&mut self, body: Map<String, Value>) {
        self.body = body;
    }

    /// Replace the request body with a serializable value.
    ///
    /// The value must serialize to a JSON object.
    pub fn set_json_body<T: Serialize>(&mut self, body: &T) -> Result<()> {
        match serde_json::to_value(body).map_err(|e| RestError::Json(e.to_string()))? {
            Value::Object(map) => {
                self.body = map;
                Ok(())
            }
            other => Err(RestError::Json(format!(
                "request body must be a JSON object, got {other}"
            ))),
        }
    }

    /// The query parameters.
    pub fn query_parameters(&self) -> &Map<String, Value> {
        &self.query_parameters
    }

    /// Replace the query parameters.
    pub fn set_query_parameters(&mut self, query_parameters: Map<String, Value>) {
        self.query_parameters = query_parameters;
    }

    /// Maximum number of timeout retries for this call.
    pub fn request_attempts_limit(&self) -> u32 {
        self.request_attempts_limit
    }

    /// Override the maximum number of timeout retries for this call.
    pub fn set_request_attempts_limit(&mut self, limit: u32) {
        self.request_attempts_limit = limit;
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("type_name", &self.type_name)
            .field("endpoint", &self.endpoint)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("query_parameters", &self.query_parameters)
            .field("request_attempts_limit", &self.request_attempts_limit)
            .finish()
    }
}
