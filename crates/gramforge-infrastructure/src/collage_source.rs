//! Remote choices archive retrieval.
//!
//! Pre-built choices documents are published as gzip-compressed tar
//! archives at a deterministic URL keyed by a short identifier (3 or 7
//! characters after the `collage/` prefix). The fetch is bounded by the
//! configured timeout, and every fault on the way (malformed key, network
//! error, bad archive) degrades to "no data retrieved".

use async_trait::async_trait;
use flate2::read::GzDecoder;
use reqwest::Client;
use std::io::Read;
use std::time::Duration;

use gramforge_core::archive::GrammarArchiveSource;
use gramforge_core::choices::strip_bom;
use gramforge_core::config::{COLLAGE_PREFIX, EngineConfig};
use gramforge_core::error::{GramforgeError, Result};

/// Name suffix identifying the choices entry inside a fetched archive.
const CHOICES_SUFFIX: &str = "choices";

/// HTTP-backed remote archive source.
pub struct CollageArchiveSource {
    client: Client,
    base_url: String,
}

impl CollageArchiveSource {
    /// Builds a source with a request timeout taken from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| GramforgeError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.collage_base_url.clone(),
        })
    }

    /// Extracts the short key from a reference such as `collage/abc`.
    /// Only 3- and 7-character alphanumeric keys are retrievable.
    fn key_of(reference: &str) -> Option<&str> {
        let key = reference.strip_prefix(COLLAGE_PREFIX)?;
        let valid_length = key.len() == 3 || key.len() == 7;
        if valid_length && key.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some(key)
        } else {
            None
        }
    }

    fn archive_url(&self, reference: &str) -> String {
        format!("{}language-{}/choices-final.tgz", self.base_url, reference)
    }

    /// Scans the archive for the first regular entry whose name ends in
    /// `choices` and returns its contents.
    fn extract_choices(bytes: &[u8]) -> Option<String> {
        let mut archive = tar::Archive::new(GzDecoder::new(bytes));
        for entry in archive.entries().ok()? {
            let mut entry = entry.ok()?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let is_choices = entry
                .path()
                .ok()
                .map(|path| path.to_string_lossy().ends_with(CHOICES_SUFFIX))
                .unwrap_or(false);
            if is_choices {
                let mut text = String::new();
                entry.read_to_string(&mut text).ok()?;
                return Some(strip_bom(&text).to_string());
            }
        }
        None
    }
}

#[async_trait]
impl GrammarArchiveSource for CollageArchiveSource {
    async fn fetch(&self, reference: &str) -> Result<Option<String>> {
        if Self::key_of(reference).is_none() {
            tracing::debug!(reference, "not a retrievable archive key");
            return Ok(None);
        }

        let url = self.archive_url(reference);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status());
        let bytes = match response {
            Ok(response) => match response.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(%url, error = %e, "failed reading remote archive body");
                    return Ok(None);
                }
            },
            Err(e) => {
                tracing::warn!(%url, error = %e, "remote archive fetch failed");
                return Ok(None);
            }
        };

        let choices = Self::extract_choices(&bytes);
        if choices.is_none() {
            tracing::warn!(%url, "remote archive held no choices entry");
        }
        Ok(choices)
    }
}
