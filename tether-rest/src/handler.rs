//! Long-lived façade turning descriptors into dispatched calls.

use std::fmt;
use std::sync::Arc;

use tether_config::ApiSettings;
use tracing::trace;

use crate::{
    Call, Client, HandlerConfig, PayloadDescriptor, PayloadFactory, PayloadRegistry, PayloadType,
    RequestBuilder, ReqwestTransport, Response, RestError, Result, Transport, TransportConfig,
};

/// Builds, configures and executes payloads for one API.
///
/// A handler is built once with the API URL, the auth headers and the attempt
/// limit, then shared. Its state is read-only, and every call gets its own
/// [`Payload`](crate::Payload) and [`Client`], so concurrent calls through a
/// cloned handler never share mutable state.
///
/// ```no_run
/// use tether_rest::{Call, Handler, HandlerConfig, PayloadKind, PayloadRegistry};
///
/// #[derive(Default)]
/// struct ShowUser;
///
/// impl PayloadKind for ShowUser {
///     fn endpoint_template(&self) -> &str { "/users" }
///     fn method(&self) -> &str { "GET" }
/// }
///
/// # async fn run() -> tether_rest::Result<()> {
/// let config = HandlerConfig::builder("https://api.example.com")
///     .auth_header("X-Key", "secret")
///     .build();
/// let registry = PayloadRegistry::new().with::<ShowUser>("users.show");
/// let handler = Handler::with_reqwest(config, registry, &Default::default())?;
///
/// let response = handler
///     .run("users.show", Call::new().route_parameter(42u64))
///     .await?;
/// println!("{}", response.text());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Handler {
    config: Arc<HandlerConfig>,
    factory: PayloadFactory,
    transport: Arc<dyn Transport>,
}

impl Handler {
    /// Create a handler over an explicit transport.
    pub fn new(
        config: HandlerConfig,
        registry: impl Into<Arc<PayloadRegistry>>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        if config.api_url.trim().is_empty() {
            return Err(RestError::ApiUrlMissing);
        }

        Ok(Self {
            config: Arc::new(config),
            factory: PayloadFactory::new(registry),
            transport,
        })
    }

    /// Create a handler over a reqwest transport.
    pub fn with_reqwest(
        config: HandlerConfig,
        registry: impl Into<Arc<PayloadRegistry>>,
        transport_config: &TransportConfig,
    ) -> Result<Self> {
        let transport = ReqwestTransport::new(transport_config)?;
        Self::new(config, registry, Arc::new(transport))
    }

    /// Create a handler from loaded settings over a default reqwest transport.
    pub fn from_settings(
        settings: &ApiSettings,
        registry: impl Into<Arc<PayloadRegistry>>,
    ) -> Result<Self> {
        Self::with_reqwest(
            HandlerConfig::from_settings(settings),
            registry,
            &TransportConfig::default(),
        )
    }

    /// The handler configuration.
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// The payload factory.
    pub fn factory(&self) -> &PayloadFactory {
        &self.factory
    }

    /// Build the payload named by `descriptor`, apply `call` and execute it.
    ///
    /// Auth headers are applied before the call headers, so the latter win.
    pub async fn run<D: PayloadDescriptor + ?Sized>(
        &self,
        descriptor: &D,
        call: Call,
    ) -> Result<Response> {
        let mut payload = self.factory.make(descriptor)?;
        payload.set_request_attempts_limit(self.config.request_attempts_limit);

        for (name, value) in &self.config.auth_headers {
            payload.add_header(name.as_str(), value.as_str());
        }

        for (name, value) in call.headers {
            payload.add_header(name, value);
        }

        payload.set_body(call.body);
        payload.set_query_parameters(call.query_parameters);

        for parameter in call.route_parameters {
            payload.add_route_parameter(parameter)?;
        }

        trace!(
            descriptor = descriptor.payload_name(),
            payload = payload.type_name(),
            "Payload prepared"
        );

        Client::new(self.transport.clone(), payload, self.config.api_url.as_str())?
            .with_retry_delay(self.config.retry_delay)
            .execute()
            .await
    }

    /// Start a fluent request for the payload named by `descriptor`.
    pub fn request<D: PayloadDescriptor + ?Sized>(&self, descriptor: &D) -> RequestBuilder<'_> {
        RequestBuilder::new(self, PayloadType::new(descriptor.payload_name()))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("config", &self.config)
            .field("factory", &self.factory)
            .finish_non_exhaustive()
    }
}
