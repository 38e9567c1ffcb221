//! Registry-backed tarball queries
//!
//! The HTTP body stream is adapted into a blocking reader and the gunzip/tar
//! pass runs on the blocking pool, so bytes are pulled from the network only
//! as fast as the decoder consumes them.

use std::io::Read;

use pluck_core::error::PluckError;
use pluck_registry::RegistryClient;
use tokio_util::io::{StreamReader, SyncIoBridge};
use tracing::debug;

use crate::extract::{extract_file, list_top_level};
use crate::ArchiveResult;

/// Runs archive queries directly against tarball URLs
#[derive(Debug, Clone)]
pub struct TarballExtractor {
    client: RegistryClient,
}

impl TarballExtractor {
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }

    /// Stream the tarball and return the content of one file
    pub async fn extract_file(&self, tarball_url: &str, target: &str) -> ArchiveResult<Vec<u8>> {
        debug!("Extracting {} from {}", target, tarball_url);
        let target = target.to_string();
        self.run(tarball_url, move |reader| extract_file(reader, &target))
            .await
    }

    /// Stream the tarball and list its top-level files
    pub async fn list_top_level(&self, tarball_url: &str) -> ArchiveResult<Vec<String>> {
        debug!("Listing top-level files of {}", tarball_url);
        self.run(tarball_url, list_top_level).await
    }

    async fn run<T, F>(&self, tarball_url: &str, query: F) -> ArchiveResult<T>
    where
        T: Send + 'static,
        F: FnOnce(Box<dyn Read + Send>) -> ArchiveResult<T> + Send + 'static,
    {
        let stream = self.client.open_tarball(tarball_url).await?;
        let reader = SyncIoBridge::new(StreamReader::new(stream));

        tokio::task::spawn_blocking(move || query(Box::new(reader)))
            .await
            .map_err(|e| PluckError::Unexpected {
                message: format!("archive task failed: {}", e),
            })?
    }
}
