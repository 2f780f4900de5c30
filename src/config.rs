use std::env;
use std::net::SocketAddr;

use crate::error::ConfigError;

const DEFAULT_DATABASE_URL: &str = "sqlite://cramless.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub quiz_service_url: Option<String>,
}

impl Config {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let quiz_service_url = lookup("QUIZ_SERVICE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            database_url,
            bind_addr,
            quiz_service_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup_in(&[])).unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.quiz_service_url.is_none());
    }

    #[test]
    fn quiz_url_loses_trailing_slash() {
        let config = Config::from_lookup(lookup_in(&[("QUIZ_SERVICE_URL", "http://localhost:5000/")])).unwrap();
        assert_eq!(config.quiz_service_url.as_deref(), Some("http://localhost:5000"));
    }

    #[test]
    fn invalid_bind_addr_is_a_config_error() {
        let err = Config::from_lookup(lookup_in(&[("BIND_ADDR", "not-an-address")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BIND_ADDR", .. }));
        assert!(err.to_string().starts_with("BIND_ADDR is invalid"));
    }
}
