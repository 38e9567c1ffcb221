//! Version specifier resolution for the pluck gateway
//!
//! Turns a human specifier (exact version, npm range or dist-tag) into one
//! concrete published version, fetching fresh registry metadata each time.

pub mod select;

// Re-export main types
pub use select::{select_version, VersionSelector};

use pluck_core::error::PluckError;
use pluck_registry::RegistryClient;
use tracing::{debug, info};

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, PluckError>;

/// Registry-backed version resolver
#[derive(Debug, Clone)]
pub struct VersionResolver {
    client: RegistryClient,
}

impl VersionResolver {
    /// Create a resolver over a registry client
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }

    /// Resolve a specifier to a version string present in the package's `versions`
    pub async fn resolve(&self, package_name: &str, specifier: &str) -> ResolverResult<String> {
        let metadata = self.client.fetch_metadata(package_name).await?;
        debug!(
            "{} has {} versions and {} dist-tags",
            package_name,
            metadata.versions.len(),
            metadata.dist_tags.len()
        );

        let version = select_version(&metadata, specifier).ok_or_else(|| PluckError::VersionNotFound {
            package: package_name.to_string(),
            specifier: specifier.to_string(),
        })?;

        info!("Resolved {}@{} to {}", package_name, specifier, version);
        Ok(version.to_string())
    }
}
