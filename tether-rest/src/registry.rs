//! Payload registry and factory.
//!
//! Payload kinds are registered under a descriptor name at startup. The
//! factory turns a descriptor back into a fresh [`Payload`] on every call.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{Payload, PayloadKind, RestError, Result};

/// Names the payload kind to instantiate.
///
/// Host applications usually implement this on an enum of their calls.
pub trait PayloadDescriptor {
    /// The name the payload kind was registered under.
    fn payload_name(&self) -> &str;
}

impl PayloadDescriptor for str {
    fn payload_name(&self) -> &str {
        self
    }
}

impl PayloadDescriptor for String {
    fn payload_name(&self) -> &str {
        self
    }
}

impl<D: PayloadDescriptor + ?Sized> PayloadDescriptor for &D {
    fn payload_name(&self) -> &str {
        (**self).payload_name()
    }
}

/// An owned payload descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PayloadType(String);

impl PayloadType {
    /// Create a descriptor from a registered name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl PayloadDescriptor for PayloadType {
    fn payload_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PayloadType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

type Constructor = Arc<dyn Fn() -> Payload + Send + Sync>;

/// Maps descriptor names to payload constructors.
#[derive(Clone, Default)]
pub struct PayloadRegistry {
    constructors: HashMap<String, Constructor>,
}

impl PayloadRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind built through its `Default` implementation.
    pub fn register<K: PayloadKind + Default>(&mut self, name: impl Into<String>) -> &mut Self {
        self.register_with(name, K::default)
    }

    /// Register a kind built by a constructor function.
    ///
    /// A later registration under the same name replaces the earlier one.
    pub fn register_with<K, F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        K: PayloadKind,
        F: Fn() -> K + Send + Sync + 'static,
    {
        self.constructors
            .insert(name.into(), Arc::new(move || Payload::new(constructor())));
        self
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with<K: PayloadKind + Default>(mut self, name: impl Into<String>) -> Self {
        self.register::<K>(name);
        self
    }

    /// Check if a descriptor name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Whether no kinds are registered.
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    fn constructor(&self, name: &str) -> Option<&Constructor> {
        self.constructors.get(name)
    }
}

impl fmt::Debug for PayloadRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("PayloadRegistry").field("kinds", &names).finish()
    }
}

/// Builds payloads from descriptors.
#[derive(Debug, Clone)]
pub struct PayloadFactory {
    registry: Arc<PayloadRegistry>,
}

impl PayloadFactory {
    /// Create a factory over a populated registry.
    pub fn new(registry: impl Into<Arc<PayloadRegistry>>) -> Self {
        Self {
            registry: registry.into(),
        }
    }

    /// The registry this factory resolves against.
    pub fn registry(&self) -> &PayloadRegistry {
        &self.registry
    }

    /// Instantiate the payload kind named by `descriptor`.
    pub fn make<D: PayloadDescriptor + ?Sized>(&self, descriptor: &D) -> Result<Payload> {
        let name = descriptor.payload_name();
        let constructor = self
            .registry
            .constructor(name)
            .ok_or_else(|| RestError::PayloadClassNotFound(name.to_string()))?;
        Ok(constructor())
    }
}
