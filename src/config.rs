//! Configuration Management
//!
//! Connection settings for the Kibana and Elasticsearch backends. Values come
//! from the config file, then environment variables, then CLI flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Connection settings for one backend
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Base URL, e.g. `https://kibana.example.com:5601`
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout; the HTTP client default applies when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ConnectionConfig {
    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Overlay `<PREFIX>_ENDPOINT`, `<PREFIX>_USERNAME`, `<PREFIX>_PASSWORD`
    /// and `<PREFIX>_API_KEY` from the process environment
    pub fn apply_env(&mut self, prefix: &str) {
        self.apply_env_with(prefix, |key| std::env::var(key).ok());
    }

    fn apply_env_with(&mut self, prefix: &str, lookup: impl Fn(&str) -> Option<String>) {
        let get = |suffix: &str| lookup(&format!("{}_{}", prefix, suffix)).filter(|v| !v.is_empty());

        // Elasticsearch tooling conventionally takes a comma separated list
        let endpoint = get("ENDPOINT").or_else(|| {
            get("ENDPOINTS").and_then(|list| list.split(',').next().map(|s| s.trim().to_string()))
        });

        if let Some(endpoint) = endpoint {
            self.endpoint = Some(endpoint);
        }
        if let Some(username) = get("USERNAME") {
            self.username = Some(username);
        }
        if let Some(password) = get("PASSWORD") {
            self.password = Some(password);
        }
        if let Some(api_key) = get("API_KEY") {
            self.api_key = Some(api_key);
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Kibana: alerting rules and connectors
    #[serde(default)]
    pub kibana: ConnectionConfig,
    /// Elasticsearch: role mappings
    #[serde(default)]
    pub elasticsearch: ConnectionConfig,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("esrec").join("config.json"))
    }

    /// Load configuration from disk and the environment.
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read_file(&path)?,
                _ => Self::default(),
            },
        };

        config.kibana.apply_env("KIBANA");
        config.elasticsearch.apply_env("ELASTICSEARCH");

        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_config_file() {
        let config: Config = serde_json::from_str(
            r#"{
                "kibana": {"endpoint": "http://localhost:5601", "username": "elastic", "password": "changeme", "timeout_secs": 30},
                "elasticsearch": {"endpoint": "http://localhost:9200", "api_key": "abc=="}
            }"#,
        )
        .unwrap();

        assert_eq!(config.kibana.endpoint.as_deref(), Some("http://localhost:5601"));
        assert_eq!(config.kibana.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.elasticsearch.api_key.as_deref(), Some("abc=="));
        assert_eq!(config.elasticsearch.timeout(), None);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.kibana, ConnectionConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let vars = env(&[
            ("KIBANA_ENDPOINT", "https://kb.internal:5601"),
            ("KIBANA_PASSWORD", "from-env"),
            ("KIBANA_USERNAME", ""),
        ]);
        let mut conn = ConnectionConfig {
            endpoint: Some("http://localhost:5601".to_string()),
            username: Some("elastic".to_string()),
            password: Some("changeme".to_string()),
            ..Default::default()
        };

        conn.apply_env_with("KIBANA", |k| vars.get(k).cloned());

        assert_eq!(conn.endpoint.as_deref(), Some("https://kb.internal:5601"));
        assert_eq!(conn.password.as_deref(), Some("from-env"));
        // Empty variables do not clear values from the file
        assert_eq!(conn.username.as_deref(), Some("elastic"));
    }

    #[test]
    fn test_elasticsearch_endpoints_list() {
        let vars = env(&[("ELASTICSEARCH_ENDPOINTS", "http://es1:9200, http://es2:9200")]);
        let mut conn = ConnectionConfig::default();

        conn.apply_env_with("ELASTICSEARCH", |k| vars.get(k).cloned());

        assert_eq!(conn.endpoint.as_deref(), Some("http://es1:9200"));
    }

    #[test]
    fn test_debug_masks_secrets() {
        let conn = ConnectionConfig {
            password: Some("hunter2".to_string()),
            api_key: Some("topsecret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", conn);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("topsecret"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = std::env::temp_dir().join("esrec-does-not-exist").join("config.json");
        assert!(Config::load(Some(&path)).is_err());
    }
}
