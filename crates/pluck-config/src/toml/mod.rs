//! pluck.toml configuration parsing

use std::net::SocketAddr;
use std::time::Duration;

use pluck_core::error::PluckError;
use serde::{Deserialize, Serialize};

use crate::ConfigResult;

/// Public npm registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Default upstream request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Complete pluck.toml configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PluckToml {
    /// HTTP server section
    #[serde(default)]
    pub server: ServerSection,

    /// Upstream registry section
    #[serde(default)]
    pub registry: RegistrySection,
}

/// HTTP server section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSection {
    /// Socket address to bind
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

/// Upstream registry section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySection {
    /// Registry base URL
    #[serde(default = "default_registry")]
    pub url: String,

    /// Upper bound on every upstream call, in seconds
    #[serde(default = "default_timeout_secs", rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// User agent sent upstream
    #[serde(default = "default_user_agent", rename = "user-agent")]
    pub user_agent: String,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_registry() -> String {
    DEFAULT_REGISTRY.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("pluck/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            url: default_registry(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl RegistrySection {
    /// Upstream timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PluckToml {
    /// Validate field values and normalize the registry URL
    pub fn validate(mut self) -> ConfigResult<Self> {
        let parsed = url::Url::parse(&self.registry.url).map_err(|e| PluckError::Config {
            field: "registry.url".to_string(),
            reason: format!("'{}' is not a valid URL: {}", self.registry.url, e),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PluckError::Config {
                field: "registry.url".to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if self.registry.timeout_secs == 0 {
            return Err(PluckError::Config {
                field: "registry.timeout-secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        self.registry.url = self.registry.url.trim_end_matches('/').to_string();
        Ok(self)
    }
}

/// Parse one configuration file into a layer table
///
/// The table is kept as-is for field-level merging, but it must already
/// describe a well-typed [`PluckToml`] so errors point at the file that
/// caused them rather than at the merged result.
pub fn parse_layer(content: &str, origin: &str) -> ConfigResult<::toml::Table> {
    let config_error = |reason: String| PluckError::Config {
        field: origin.to_string(),
        reason,
    };

    let table: ::toml::Table = content
        .parse()
        .map_err(|e: ::toml::de::Error| config_error(e.to_string()))?;
    ::toml::Value::Table(table.clone())
        .try_into::<PluckToml>()
        .map_err(|e| config_error(e.to_string()))?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PluckToml::default();
        assert_eq!(config.server.listen.to_string(), "127.0.0.1:3000");
        assert_eq!(config.registry.url, DEFAULT_REGISTRY);
        assert_eq!(config.registry.timeout(), Duration::from_secs(30));
        assert!(config.registry.user_agent.starts_with("pluck/"));
    }

    #[test]
    fn test_parse_partial_file() {
        let layer = parse_layer(
            r#"
            [registry]
            url = "https://registry.npmmirror.com/"
            timeout-secs = 5
            "#,
            "pluck.toml",
        )
        .unwrap();
        let config = ::toml::Value::Table(layer)
            .try_into::<PluckToml>()
            .unwrap()
            .validate()
            .unwrap();

        assert_eq!(config.registry.url, "https://registry.npmmirror.com");
        assert_eq!(config.registry.timeout_secs, 5);
        assert_eq!(config.server, ServerSection::default());
    }

    #[test]
    fn test_parse_error_names_file() {
        for content in ["[server]\nlisten = 42", "[registry\n"] {
            let err = parse_layer(content, "/etc/pluck/pluck.toml").unwrap_err();
            match err {
                PluckError::Config { field, .. } => assert_eq!(field, "/etc/pluck/pluck.toml"),
                other => panic!("Expected Config error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_layer_keeps_only_written_fields() {
        let layer = parse_layer("[registry]\ntimeout-secs = 7\n", "pluck.toml").unwrap();
        let registry = layer["registry"].as_table().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!layer.contains_key("server"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PluckToml::default();
        config.registry.url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = PluckToml::default();
        config.registry.url = "ftp://registry.example".to_string();
        assert!(config.validate().is_err());

        let mut config = PluckToml::default();
        config.registry.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
