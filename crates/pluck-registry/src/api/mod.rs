//! npm registry API response types

use std::collections::HashMap;

use pluck_core::types::manifest::lenient;
use pluck_core::types::VersionManifest;
use serde::{Deserialize, Serialize};

/// Package metadata (packument) response from the registry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PackageMetadataResponse {
    /// Package name
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Tag name to version
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
    /// All versions metadata
    pub versions: HashMap<String, VersionManifest>,
}

impl PackageMetadataResponse {
    /// Every published version string
    pub fn version_keys(&self) -> impl Iterator<Item = &str> {
        self.versions.keys().map(String::as_str)
    }

    /// Look up a dist-tag
    pub fn tag(&self, tag: &str) -> Option<&str> {
        self.dist_tags.get(tag).map(String::as_str)
    }
}
