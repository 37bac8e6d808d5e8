//! REST pipeline error types.

use tether_config::ConfigError;
use thiserror::Error;

/// Result type for REST pipeline operations.
pub type Result<T> = std::result::Result<T, RestError>;

/// Errors raised while building or dispatching a payload.
///
/// Only an HTTP 408 is recovered from locally (see [`Client`](crate::Client)).
/// Everything else reaches the caller as one of these variants.
#[derive(Debug, Error)]
pub enum RestError {
    /// The base API URL was empty or not configured.
    #[error("API URL is missing from configuration")]
    ApiUrlMissing,

    /// The payload kind resolved an empty endpoint template.
    #[error("Endpoint is missing for payload `{payload}`")]
    EndpointMissing {
        /// Type name of the payload kind.
        payload: String,
    },

    /// The payload kind resolved an empty HTTP method.
    #[error("Method is missing for payload `{payload}`")]
    MethodMissing {
        /// Type name of the payload kind.
        payload: String,
    },

    /// The payload kind resolved a method other than GET, POST or PUT.
    #[error("Method `{method}` is not supported for payload `{payload}`")]
    MethodUnsupported {
        /// Type name of the payload kind.
        payload: String,
        /// The method as resolved.
        method: String,
    },

    /// No payload kind is registered under the descriptor.
    #[error("Payload class `{0}` does not exist")]
    PayloadClassNotFound(String),

    /// Timeouts kept coming after every permitted retry.
    #[error("Request attempt limit reached for payload `{payload}` after {attempts} retries")]
    RequestAttemptLimitReached {
        /// Type name of the payload kind.
        payload: String,
        /// Retries performed before giving up.
        attempts: u32,
    },

    /// The remote service answered with a non-success, non-timeout status.
    #[error("Request failed for `{payload}`. Status: `{status}`. Body: `{body}`.")]
    RequestFailed {
        /// Type name of the payload kind.
        payload: String,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A route parameter with no content was supplied.
    #[error("Route parameter must not be empty")]
    InvalidRouteParameter,

    /// A header name or value cannot be sent over HTTP.
    #[error("Invalid header `{0}`")]
    InvalidHeader(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Transport-level failure (connect, TLS, per-attempt timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RestError {
    /// Get the HTTP status code carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::RequestAttemptLimitReached { .. } => Some(408),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get the payload type name this error was raised for, if any.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::EndpointMissing { payload }
            | Self::MethodMissing { payload }
            | Self::MethodUnsupported { payload, .. }
            | Self::RequestAttemptLimitReached { payload, .. }
            | Self::RequestFailed { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Check if this error was raised before anything was sent.
    pub fn is_pre_dispatch(&self) -> bool {
        matches!(
            self,
            Self::ApiUrlMissing
                | Self::EndpointMissing { .. }
                | Self::MethodMissing { .. }
                | Self::MethodUnsupported { .. }
                | Self::PayloadClassNotFound(_)
                | Self::InvalidRouteParameter
                | Self::InvalidHeader(_)
                | Self::Config(_)
        )
    }
}
