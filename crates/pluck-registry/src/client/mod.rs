//! HTTP client implementation with connection pooling
//!
//! Each upstream call is attempted exactly once; the first failure ends the
//! request.

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{Stream, TryStreamExt};
use pluck_core::error::PluckError;
use pluck_core::types::VersionManifest;
use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::PackageMetadataResponse;
use crate::RegistryResult;

/// Accept header for the abbreviated packument
const ABBREVIATED_METADATA: &str = "application/vnd.npm.install-v1+json";

/// Tarball body as a stream of chunks
pub type TarballStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Transport failure while a response body was streaming.
///
/// Wrapped inside the `std::io::Error` items of a [`TarballStream`] so that
/// readers further down the pipeline can tell a dropped connection from a
/// corrupt archive.
#[derive(Debug)]
pub struct BodyError(reqwest::Error);

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "response body interrupted: {}", self.0)
    }
}

impl std::error::Error for BodyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Connection settings for the registry client
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base registry URL, without trailing slash
    pub base_url: String,
    /// Upper bound on each upstream call, body included
    pub timeout: Duration,
    /// User agent sent upstream
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://registry.npmjs.org".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("pluck/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client for npm registry operations
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Base registry URL
    base_url: String,
}

impl RegistryClient {
    /// Create registry client from configuration
    pub fn new(config: RegistryConfig) -> RegistryResult<Self> {
        let client = ClientBuilder::new()
            // Connection pooling configuration
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout)
            .gzip(true)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| PluckError::Unexpected {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base registry URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the packument (all versions and dist-tags) for a package
    pub async fn fetch_metadata(&self, package_name: &str) -> RegistryResult<PackageMetadataResponse> {
        let url = format!("{}/{}", self.base_url, encode_package_name(package_name));
        let response = self.get(&url, Some(ABBREVIATED_METADATA)).await?;
        parse_json(package_name, &url, response).await
    }

    /// Fetch the full manifest of one published version
    pub async fn fetch_version_manifest(&self, package_name: &str, version: &str) -> RegistryResult<VersionManifest> {
        let url = format!(
            "{}/{}/{}",
            self.base_url,
            encode_package_name(package_name),
            version
        );
        let response = self.get(&url, None).await?;
        parse_json(package_name, &url, response).await
    }

    /// Open a tarball body as a chunk stream
    pub async fn open_tarball(&self, tarball_url: &str) -> RegistryResult<TarballStream> {
        let response = self.get(tarball_url, None).await?;
        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, BodyError(e)));
        Ok(Box::pin(stream))
    }

    /// Single GET; transport errors and non-success statuses are upstream failures
    async fn get(&self, url: &str, accept: Option<&str>) -> RegistryResult<Response> {
        debug!("GET {}", url);
        let mut request = self.client.get(url);
        if let Some(accept) = accept {
            request = request.header(reqwest::header::ACCEPT, accept);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            PluckError::upstream(format!("Failed to reach {}", url), e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} returned status {}", url, status);
            return Err(PluckError::upstream_status(url, status.as_u16()));
        }

        Ok(response)
    }
}

/// Read a JSON body; unreadable bodies are upstream failures, bad JSON is malformed data
async fn parse_json<T: DeserializeOwned>(package_name: &str, url: &str, response: Response) -> RegistryResult<T> {
    let body = response
        .bytes()
        .await
        .map_err(|e| PluckError::upstream(format!("Failed to read body of {}", url), e))?;

    serde_json::from_slice(&body).map_err(|e| PluckError::MalformedRegistryData {
        package: package_name.to_string(),
        reason: e.to_string(),
    })
}

/// Encode package name for URL (handle scoped packages)
pub fn encode_package_name(name: &str) -> String {
    if name.starts_with('@') {
        // Scoped package: @org/pkg -> @org%2fpkg
        name.replacen('/', "%2f", 1)
    } else {
        name.to_string()
    }
}
