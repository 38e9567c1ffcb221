//! Request dispatch
//!
//! Turns one request path into one response: resolve the version, fetch its
//! manifest, then either stream one file out of the tarball or list the
//! package's top-level files. All requests are independent; nothing is cached.

use hyper::{Method, Request, Response, StatusCode};
use pluck_archive::TarballExtractor;
use pluck_config::PluckToml;
use pluck_content::{listing, sniff};
use pluck_core::error::{PluckError, PluckResult};
use pluck_core::types::{resolve_entry_point, PackageRequest, RequestMode};
use pluck_registry::{RegistryClient, RegistryConfig};
use pluck_resolver::VersionResolver;
use tracing::{debug, error, info, warn};

use crate::response::{self, Body};

#[cfg(test)]
mod tests;

/// Shared, immutable request handler
#[derive(Debug, Clone)]
pub struct Gateway {
    client: RegistryClient,
    resolver: VersionResolver,
    extractor: TarballExtractor,
}

impl Gateway {
    /// Build the gateway and its pooled registry client from configuration
    pub fn new(config: &PluckToml) -> PluckResult<Self> {
        let client = RegistryClient::new(RegistryConfig {
            base_url: config.registry.url.clone(),
            timeout: config.registry.timeout(),
            user_agent: config.registry.user_agent.clone(),
        })?;
        Ok(Self::with_client(client))
    }

    /// Build the gateway around an existing registry client
    pub fn with_client(client: RegistryClient) -> Self {
        Self {
            resolver: VersionResolver::new(client.clone()),
            extractor: TarballExtractor::new(client.clone()),
            client,
        }
    }

    /// Registry this gateway reads from
    pub fn registry_url(&self) -> &str {
        self.client.base_url()
    }

    /// Handle one request; failures become error responses, never panics
    pub async fn handle<B>(&self, request: Request<B>) -> Response<Body> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        info!("{} {}", method, path);

        let response = match method {
            Method::GET | Method::HEAD => self.respond(&path).await,
            _ => response::method_not_allowed(),
        };

        info!("{} {} -> {}", method, path, response.status().as_u16());
        if method == Method::HEAD {
            response::without_body(response)
        } else {
            response
        }
    }

    async fn respond(&self, path: &str) -> Response<Body> {
        if path == "/" {
            return response::welcome();
        }

        match self.serve_package(path).await {
            Ok(response) => response,
            Err(err) => {
                let status = response::status_for(&err);
                if status == StatusCode::GATEWAY_TIMEOUT {
                    warn!("{} failed upstream: {}", path, err);
                } else if status.is_server_error() {
                    error!("{} failed: {}", path, err);
                } else {
                    debug!("{} not found: {}", path, err);
                }
                response::error(&err)
            }
        }
    }

    async fn serve_package(&self, path: &str) -> PluckResult<Response<Body>> {
        let request = PackageRequest::parse(path)?;
        let name = request.package_name.as_str();

        let version = self
            .resolver
            .resolve(name, &request.version_specifier)
            .await?;

        let manifest = self.client.fetch_version_manifest(name, &version).await?;
        let tarball_url = manifest
            .tarball_url()
            .ok_or_else(|| PluckError::MalformedRegistryData {
                package: name.to_string(),
                reason: format!("version {} has no dist.tarball", version),
            })?;
        debug!("Tarball for {}@{}: {}", name, version, tarball_url);

        match request.mode() {
            RequestMode::Listing => {
                let paths = self.extractor.list_top_level(tarball_url).await?;
                let html = listing::render(name, &version, &paths);
                Ok(response::listing(html))
            }
            RequestMode::EntryPoint => {
                let entry_point = resolve_entry_point(name, &version, &manifest)?;
                debug!("Entry point of {}@{} is {}", name, version, entry_point);
                self.serve_file(tarball_url, &entry_point).await
            }
            RequestMode::File(sub_path) => self.serve_file(tarball_url, sub_path).await,
        }
    }

    async fn serve_file(&self, tarball_url: &str, target: &str) -> PluckResult<Response<Body>> {
        let content = self.extractor.extract_file(tarball_url, target).await?;
        let sniffed = sniff(&content);
        debug!("{} sniffed as {}", target, sniffed.content_type());
        Ok(response::file(content, &sniffed))
    }
}
