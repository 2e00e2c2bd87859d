//! Async file downloader with progress reporting and URL validation.
//!
//! Streams a response body to disk using reqwest. The destination file is
//! fully written and flushed before [`download_file`] returns, so callers can
//! act on it immediately.

use futures::StreamExt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::config::Settings;
use crate::error::{IoContext, Result, VenvError};
use crate::paths;

// ============================================================================
// URL Security Validation
// ============================================================================

/// Which URLs downloads may come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPolicy {
    /// Allowed hosts; subdomains of an entry are allowed too.
    pub allowed_domains: Vec<String>,
    pub require_https: bool,
}

impl DownloadPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            allowed_domains: settings.allowed_domains.clone(),
            require_https: settings.require_https,
        }
    }

    /// Validates that a URL is safe for downloading.
    ///
    /// Checks:
    /// - URL scheme must be HTTPS (or HTTP when `require_https` is off)
    /// - Host must be in the allowed domain list
    pub fn validate(&self, url_str: &str) -> Result<()> {
        let url = Url::parse(url_str)
            .map_err(|e| VenvError::UrlRejected(format!("Invalid URL {}: {}", url_str, e)))?;

        let scheme_ok = match url.scheme() {
            "https" => true,
            "http" => !self.require_https,
            _ => false,
        };
        if !scheme_ok {
            return Err(VenvError::UrlRejected(format!(
                "URL must use HTTPS: {}",
                url_str
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| VenvError::UrlRejected(format!("URL must have a host: {}", url_str)))?;

        let is_allowed = self
            .allowed_domains
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{}", domain)));

        if !is_allowed {
            return Err(VenvError::UrlRejected(format!(
                "Download domain not allowed: {}. Allowed: {:?}",
                host, self.allowed_domains
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Download Progress
// ============================================================================

/// Progress information during a download.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    /// Bytes downloaded so far.
    pub bytes_downloaded: u64,
    /// Total bytes expected (if known from Content-Length header).
    pub total_bytes: Option<u64>,
    /// Progress percentage (0.0 to 100.0), or None if total is unknown.
    pub percent: Option<f32>,
}

impl DownloadProgress {
    fn new(bytes_downloaded: u64, total_bytes: Option<u64>) -> Self {
        let percent = total_bytes.map(|total| {
            if total > 0 {
                (bytes_downloaded as f32 / total as f32) * 100.0
            } else {
                0.0
            }
        });

        Self {
            bytes_downloaded,
            total_bytes,
            percent,
        }
    }
}

// ============================================================================
// Download Function
// ============================================================================

/// Downloads a file from a URL with streaming and progress reporting.
///
/// Redirects are followed by the client. Returns the number of bytes written.
///
/// # Errors
///
/// Returns an error if:
/// - The URL is rejected by `policy`.
/// - The network request fails or the stream breaks midway.
/// - The server returns a non-success status code.
/// - The file cannot be created or written.
pub async fn download_file<F>(
    client: &reqwest::Client,
    policy: &DownloadPolicy,
    url: &str,
    dest: &Path,
    progress_cb: F,
) -> Result<u64>
where
    F: Fn(DownloadProgress),
{
    info!("Downloading {} to {}", url, dest.display());

    policy.validate(url)?;

    paths::ensure_parent_dir(dest)?;

    let network = |source| VenvError::Network {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(network)?;

    let status = response.status();
    if !status.is_success() {
        return Err(VenvError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let total_bytes = response.content_length();
    debug!("Content-Length: {:?}", total_bytes);

    let mut file = File::create(dest)
        .await
        .io_context(|| format!("Failed to create file: {}", dest.display()))?;

    let mut stream = response.bytes_stream();
    let mut bytes_downloaded: u64 = 0;

    progress_cb(DownloadProgress::new(0, total_bytes));

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(network)?;

        file.write_all(&chunk)
            .await
            .io_context(|| format!("Failed to write to {}", dest.display()))?;

        bytes_downloaded += chunk.len() as u64;
        progress_cb(DownloadProgress::new(bytes_downloaded, total_bytes));
    }

    file.flush()
        .await
        .io_context(|| format!("Failed to flush {}", dest.display()))?;

    info!(
        "Download complete: {} bytes written to {}",
        bytes_downloaded,
        dest.display()
    );

    Ok(bytes_downloaded)
}
