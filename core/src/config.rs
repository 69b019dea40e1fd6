//! Process-level configuration read from the environment.

use std::time::Duration;

use crate::error::ConfigError;

const API_URL: &str = "API_URL";
const API_TIMEOUT_MS: &str = "API_TIMEOUT_MS";

/// Where the host API lives and how long an exchange may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Applied by the bundled reqwest exchange only.
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `API_URL` (required) and `API_TIMEOUT_MS` (optional).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(API_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingVar(API_URL))?;

        let timeout = match lookup(API_TIMEOUT_MS) {
            Some(raw) => {
                let millis: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidVar {
                        name: API_TIMEOUT_MS,
                        message: e.to_string(),
                    }
                })?;
                Some(Duration::from_millis(millis))
            }
            None => None,
        };

        Ok(Self { base_url, timeout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn reads_base_url_and_timeout() {
        let config =
            ApiConfig::from_lookup(lookup(&[("API_URL", "http://api.test/"), ("API_TIMEOUT_MS", "2500")])).unwrap();
        assert_eq!(config.base_url, "http://api.test/");
        assert_eq!(config.timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn missing_url_is_an_error() {
        let err = ApiConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("API_URL")));

        let blank = ApiConfig::from_lookup(lookup(&[("API_URL", "  ")])).unwrap_err();
        assert!(matches!(blank, ConfigError::MissingVar("API_URL")));
    }

    #[test]
    fn bad_timeout_is_an_error() {
        let err = ApiConfig::from_lookup(lookup(&[("API_URL", "http://x"), ("API_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: "API_TIMEOUT_MS", .. }));
    }
}
