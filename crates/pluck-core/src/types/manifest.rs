//! Per-version package manifest and default entry point selection.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{PluckError, PluckResult};
use crate::utils::path::ensure_leading_slash;

/// The manifest of one published version, as served by the registry.
///
/// Only the fields the gateway acts on are typed. Entry point fields are kept
/// as raw JSON, and typed fields holding a value of the wrong JSON type read
/// as absent, so one odd field never rejects the whole manifest.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VersionManifest {
    /// Package name
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Version string
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<String>,
    /// CDN-specific entry point
    #[serde(default)]
    pub jsdelivr: Option<Value>,
    /// Conditional exports map
    #[serde(default)]
    pub exports: Option<Value>,
    /// Main entry point
    #[serde(default)]
    pub main: Option<Value>,
    /// Distribution information
    #[serde(default, deserialize_with = "lenient")]
    pub dist: Option<DistInfo>,
}

/// Distribution information for the package tarball
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DistInfo {
    /// Tarball download URL
    #[serde(default, deserialize_with = "lenient")]
    pub tarball: Option<String>,
}

/// Deserialize an optional field, reading a value of the wrong JSON type as absent
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

impl VersionManifest {
    /// Tarball URL, if the registry supplied one
    pub fn tarball_url(&self) -> Option<&str> {
        self.dist
            .as_ref()
            .and_then(|dist| dist.tarball.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// The `"."` export as a plain path: a string target or an object's `default`
    fn root_export(&self) -> Option<&str> {
        let root = self.exports.as_ref()?.get(".")?;
        match root {
            Value::String(path) if !path.is_empty() => Some(path),
            Value::Object(conditions) => non_empty_str(conditions.get("default")),
            _ => None,
        }
    }

    /// Raw entry point path, in priority order `jsdelivr`, `exports["."]`, `main`
    pub fn entry_point(&self) -> Option<&str> {
        non_empty_str(self.jsdelivr.as_ref())
            .or_else(|| self.root_export())
            .or_else(|| non_empty_str(self.main.as_ref()))
    }
}

/// Pick the file served when a request names no sub-path.
///
/// The returned path always starts with `/` so it compares equal to
/// normalized archive entry paths.
pub fn resolve_entry_point(
    package: &str,
    version: &str,
    manifest: &VersionManifest,
) -> PluckResult<String> {
    manifest
        .entry_point()
        .map(ensure_leading_slash)
        .ok_or_else(|| PluckError::EntryPointNotFound {
            package: package.to_string(),
            version: version.to_string(),
        })
}
