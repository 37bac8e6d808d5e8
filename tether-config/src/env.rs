// Environment variable loading

use std::collections::HashMap;
use std::env;

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load a specific environment variable, `None` when unset
    pub fn load_var(&self, key: &str) -> Option<String> {
        env::var(self.full_key(key)).ok()
    }

    /// Load several keys at once, keyed as given; unset keys are left out
    pub fn load_vars(&self, keys: &[&str]) -> HashMap<String, String> {
        keys.iter()
            .filter_map(|key| self.load_var(key).map(|value| (key.to_string(), value)))
            .collect()
    }

    /// The variable name a key is looked up under
    pub fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    /// Map a variable name back to its key, if it carries the prefix
    pub fn strip_prefix(&self, name: &str) -> Option<String> {
        match self.prefix {
            Some(ref prefix) => name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .map(str::to_lowercase),
            None => Some(name.to_lowercase()),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(crate::DEFAULT_ENV_PREFIX.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_vars_under_prefix() {
        unsafe {
            env::set_var("TETHER_ENV_UNIT_API_URL", "http://localhost:9000");
        }

        let loader = EnvLoader::new(Some("TETHER_ENV_UNIT".to_string()));
        let vars = loader.load_vars(&["api_url", "request_attempts_limit"]);

        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("api_url").map(String::as_str), Some("http://localhost:9000"));

        unsafe {
            env::remove_var("TETHER_ENV_UNIT_API_URL");
        }
    }

    #[test]
    fn test_env_loader_missing_var() {
        let loader = EnvLoader::new(Some("TETHER_TEST".to_string()));
        assert!(loader.load_var("MISSING_VAR_67890").is_none());
    }

    #[test]
    fn test_full_key() {
        let loader = EnvLoader::new(Some("MY_APP".to_string()));
        assert_eq!(loader.full_key("api_url"), "MY_APP_API_URL");
        assert_eq!(EnvLoader::new(None).full_key("api_url"), "API_URL");
    }

    #[test]
    fn test_strip_prefix() {
        let loader = EnvLoader::default();
        assert_eq!(loader.strip_prefix("TETHER_API_URL").as_deref(), Some("api_url"));
        assert_eq!(loader.strip_prefix("TETHERAPI_URL"), None);
        assert_eq!(loader.strip_prefix("PATH"), None);
    }
}
