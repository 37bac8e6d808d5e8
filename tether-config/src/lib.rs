// API settings for Tether, resolved once by the host application

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Retries allowed per call when nothing else is configured
pub const DEFAULT_REQUEST_ATTEMPTS_LIMIT: u32 = 1;

/// Prefix of the environment variables read by default
pub const DEFAULT_ENV_PREFIX: &str = "TETHER";

const API_URL: &str = "api_url";
const REQUEST_ATTEMPTS_LIMIT: &str = "request_attempts_limit";

/// Settings consumed by the REST pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base API URL; required before a handler can be built
    pub api_url: Option<String>,
    /// Default number of timeout retries per call
    pub request_attempts_limit: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            request_attempts_limit: DEFAULT_REQUEST_ATTEMPTS_LIMIT,
        }
    }
}

impl ApiSettings {
    /// Load from `TETHER_API_URL` and `TETHER_REQUEST_ATTEMPTS_LIMIT`
    pub fn from_env() -> Result<Self> {
        Self::from_env_loader(&EnvLoader::default())
    }

    /// Load from environment variables under a custom prefix
    pub fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        Self::from_env_loader(&EnvLoader::new(Some(prefix.to_string())))
    }

    /// Load a `.env` file into the environment, then read the environment.
    ///
    /// Without a path a missing `.env` is ignored.
    pub fn from_dotenv(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
            }
            None => {
                dotenvy::dotenv().ok();
            }
        }
        Self::from_env()
    }

    /// Load from a JSON, TOML or env file, picked by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let loader = ConfigLoader::auto(path.as_ref())?;
        let value = loader.load_file(path.as_ref())?;

        if loader.format() == FileFormat::Env {
            let env = EnvLoader::default();
            let vars = match value {
                Value::Object(map) => map
                    .into_iter()
                    .filter_map(|(key, value)| {
                        let key = env.strip_prefix(&key)?;
                        value.as_str().map(|value| (key, value.to_string()))
                    })
                    .collect(),
                _ => HashMap::new(),
            };
            return Self::from_vars(&vars);
        }

        Self::from_value(value)
    }

    /// Deserialize from a JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let settings: Self = serde_json::from_value(value)
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn from_env_loader(loader: &EnvLoader) -> Result<Self> {
        Self::from_vars(&loader.load_vars(&[API_URL, REQUEST_ATTEMPTS_LIMIT]))
    }

    fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let api_url = vars
            .get(API_URL)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let request_attempts_limit = match vars.get(REQUEST_ATTEMPTS_LIMIT) {
            Some(raw) => raw.trim().parse().map_err(|e| {
                ConfigError::ParseError(format!("{} `{}`: {}", REQUEST_ATTEMPTS_LIMIT, raw, e))
            })?,
            None => DEFAULT_REQUEST_ATTEMPTS_LIMIT,
        };

        let settings = Self {
            api_url,
            request_attempts_limit,
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for ApiSettings {
    fn validate(&self) -> Result<()> {
        if let Some(ref url) = self.api_url {
            ConfigValidator::not_empty(url, API_URL)?;
            ConfigValidator::is_url(url, API_URL)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = ApiSettings::default();
        assert_eq!(settings.api_url, None);
        assert_eq!(settings.request_attempts_limit, 1);
    }

    #[test]
    fn test_from_vars() {
        let settings = ApiSettings::from_vars(&vars(&[
            ("api_url", "https://api.example.com"),
            ("request_attempts_limit", " 4 "),
        ]))
        .unwrap();

        assert_eq!(settings.api_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(settings.request_attempts_limit, 4);
    }

    #[test]
    fn test_blank_url_is_missing() {
        let settings = ApiSettings::from_vars(&vars(&[("api_url", "  ")])).unwrap();
        assert_eq!(settings.api_url, None);
    }

    #[test]
    fn test_invalid_limit() {
        let err = ApiSettings::from_vars(&vars(&[("request_attempts_limit", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_invalid_url() {
        let err = ApiSettings::from_vars(&vars(&[("api_url", "ftp://x")])).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_from_value_partial() {
        let settings = ApiSettings::from_value(json!({"api_url": "http://localhost:8080"})).unwrap();
        assert_eq!(settings.api_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(settings.request_attempts_limit, DEFAULT_REQUEST_ATTEMPTS_LIMIT);
    }
}
