//! Configuration layering, fallback logic, and environment overrides
//!
//! Layers, lowest priority first: built-in defaults, the global
//! `~/.pluck/config.toml`, the project `pluck.toml` (or an explicit path),
//! environment variables, command line flags.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use pluck_core::error::PluckError;
use tracing::debug;

use crate::toml::{parse_layer, PluckToml};
use crate::ConfigResult;

/// Environment variables consulted, in increasing priority
pub const ENV_KEYS: [&str; 4] = [
    "REGISTRY",
    "PLUCK_REGISTRY",
    "PLUCK_LISTEN",
    "PLUCK_TIMEOUT_SECS",
];

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Configuration layering and merging
#[derive(Debug, Default)]
pub struct ConfigLayering {
    /// File layers, lowest priority first
    file_layers: Vec<(::toml::Table, ConfigSource)>,
    /// Environment overrides
    env_overrides: HashMap<String, String>,
    /// CLI flag overrides
    cli_overrides: HashMap<String, String>,
}

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Global config file
    Global(Utf8PathBuf),
    /// Project or explicitly named pluck.toml file
    ProjectToml(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

async fn read_table(path: &Utf8Path) -> ConfigResult<::toml::Table> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PluckError::io(format!("Failed to read {}", path), e))?;
    parse_layer(&content, path.as_str())
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Load the project pluck.toml from the working directory, if present
    pub async fn load_project_config(&self) -> ConfigResult<Option<(::toml::Table, ConfigSource)>> {
        let path = self.cwd.join("pluck.toml");
        if !path.exists() {
            return Ok(None);
        }
        let table = read_table(&path).await?;
        Ok(Some((table, ConfigSource::ProjectToml(path))))
    }

    /// Load an explicitly named configuration file; it must exist
    pub async fn load_explicit_config(&self, path: &Utf8Path) -> ConfigResult<(::toml::Table, ConfigSource)> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        };
        let table = read_table(&path).await?;
        Ok((table, ConfigSource::ProjectToml(path)))
    }

    /// Load global configuration
    pub async fn load_global_config(&self) -> ConfigResult<Option<(::toml::Table, ConfigSource)>> {
        let Some(home_dir) = dirs::home_dir() else {
            return Ok(None);
        };

        let global_config_path = Utf8PathBuf::try_from(home_dir)
            .map_err(|e| PluckError::Config {
                field: "home_dir".to_string(),
                reason: format!("Invalid home directory path: {}", e),
            })?
            .join(".pluck")
            .join("config.toml");

        if global_config_path.exists() {
            let table = read_table(&global_config_path).await?;
            Ok(Some((table, ConfigSource::Global(global_config_path))))
        } else {
            Ok(None)
        }
    }
}

impl ConfigLayering {
    /// Create a new configuration layering system
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file layer above the ones already added
    pub fn with_file(mut self, table: ::toml::Table, source: ConfigSource) -> Self {
        debug!("Using configuration layer {:?}", source);
        self.file_layers.push((table, source));
        self
    }

    /// Set environment overrides (keys from [`ENV_KEYS`])
    pub fn with_env(mut self, overrides: HashMap<String, String>) -> Self {
        self.env_overrides = overrides;
        self
    }

    /// Set CLI overrides (`listen`, `registry`, `timeout-secs`)
    pub fn with_cli(mut self, overrides: HashMap<String, String>) -> Self {
        self.cli_overrides = overrides;
        self
    }

    /// Collect the recognized environment variables of this process
    pub fn process_env() -> HashMap<String, String> {
        ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect()
    }

    /// Merge all layers into a validated configuration
    pub fn resolve(self) -> ConfigResult<PluckToml> {
        let mut merged = ::toml::Table::new();
        for (table, _source) in self.file_layers {
            merge_tables(&mut merged, table);
        }

        let mut config: PluckToml = ::toml::Value::Table(merged)
            .try_into()
            .map_err(|e: ::toml::de::Error| PluckError::Config {
                field: "pluck.toml".to_string(),
                reason: e.to_string(),
            })?;

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut config, &self.env_overrides)?;

        // Apply CLI flag overrides (highest priority)
        Self::apply_cli_overrides(&mut config, &self.cli_overrides)?;

        config.validate()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: &mut PluckToml, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        // PLUCK_REGISTRY beats the bare REGISTRY variable
        for key in ENV_KEYS {
            let Some(value) = overrides.get(key) else {
                continue;
            };
            let source = ConfigSource::Environment(key.to_string());
            match key {
                "REGISTRY" | "PLUCK_REGISTRY" => config.registry.url = value.clone(),
                "PLUCK_LISTEN" => config.server.listen = parse_field(key, value, &source)?,
                "PLUCK_TIMEOUT_SECS" => {
                    config.registry.timeout_secs = parse_field(key, value, &source)?
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(config: &mut PluckToml, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        for (key, value) in overrides {
            let source = ConfigSource::CommandLine;
            match key.as_str() {
                "listen" => config.server.listen = parse_field(key, value, &source)?,
                "registry" => config.registry.url = value.clone(),
                "timeout-secs" => config.registry.timeout_secs = parse_field(key, value, &source)?,
                _ => {
                    return Err(PluckError::Config {
                        field: key.clone(),
                        reason: "Unknown CLI override".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn parse_field<T>(field: &str, value: &str, source: &ConfigSource) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| PluckError::Config {
        field: field.to_string(),
        reason: format!("'{}' from {:?}: {}", value, source, e),
    })
}

/// Deep-merge `overlay` into `base`; overlay wins on scalar conflicts
fn merge_tables(base: &mut ::toml::Table, overlay: ::toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(::toml::Value::Table(existing)), ::toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
