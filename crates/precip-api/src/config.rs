//! # API Configuration
//!
//! Environment-based configuration for the analytics service.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{ApiError, ApiResult};

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// JSON dataset loaded at startup
    pub dataset_path: PathBuf,

    /// Logging level
    pub log_level: String,

    /// Result list length when a request does not pass `limit`
    pub default_limit: usize,

    /// CORS allowed origins, `*` for any
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let server_addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|e| ApiError::Config(format!("SERVER_ADDR: {e}")))?;

        let default_limit = match lookup("DEFAULT_LIMIT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ApiError::Config(format!("DEFAULT_LIMIT: {e}")))?,
            None => 100,
        };

        Ok(Self {
            server_addr,
            dataset_path: lookup("DATASET_PATH")
                .map_or_else(|| PathBuf::from("data/precipitaciones.json"), PathBuf::from),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            default_limit,
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.server_addr.port(), 8080);
        assert_eq!(config.dataset_path, PathBuf::from("data/precipitaciones.json"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.default_limit, 100);
        assert_eq!(config.cors_origins, vec!["*"]);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDR", "127.0.0.1:9000"),
            ("DATASET_PATH", "/srv/data.json"),
            ("DEFAULT_LIMIT", "25"),
            ("CORS_ORIGINS", "http://a.example, http://b.example"),
        ]))
        .unwrap();
        assert_eq!(config.server_addr.port(), 9000);
        assert_eq!(config.default_limit, 25);
        assert_eq!(config.cors_origins, vec!["http://a.example", "http://b.example"]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("SERVER_ADDR", "nowhere")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DEFAULT_LIMIT", "-1")])).is_err());
    }
}
