// Tether - a structured REST request pipeline for Rust
//
// Describe an API call once as a payload kind, register it under a
// descriptor, and dispatch it through a handler that joins URLs, merges
// headers and retries request timeouts with a fixed delay.

// Re-export the pipeline
pub use tether_rest::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use tether_config;

#[cfg(feature = "config")]
pub use tether_config::ApiSettings;

#[cfg(feature = "testing")]
pub use tether_testing;

// Prelude for common imports
pub mod prelude {
    pub use tether_rest::prelude::*;

    #[cfg(feature = "config")]
    pub use tether_config::ApiSettings;
}
