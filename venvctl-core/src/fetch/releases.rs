//! Release lookup against the GitHub tags API.

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Result, VenvError};

/// One entry of the tags listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseTag {
    /// Tag name, e.g. `20.26.6`.
    #[serde(default)]
    pub name: String,
    /// Zip archive of the tagged source tree.
    pub zipball_url: String,
}

/// Fetches the release listing and returns its first entry.
///
/// The listing is assumed to be ordered newest-first; this is not verified.
///
/// # Errors
///
/// - [`VenvError::Network`] when the request cannot be made or read.
/// - [`VenvError::HttpStatus`] for any non-success status.
/// - [`VenvError::MalformedReleases`] when the body is not a list of tags.
/// - [`VenvError::NoReleases`] when the list is empty.
pub async fn fetch_latest_release(client: &reqwest::Client, url: &str) -> Result<ReleaseTag> {
    info!("Looking up latest release at {}", url);

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

    let body = response.text().await.map_err(network)?;
    let tags: Vec<ReleaseTag> =
        serde_json::from_str(&body).map_err(|source| VenvError::MalformedReleases {
            url: url.to_string(),
            source,
        })?;

    debug!("Release listing has {} entries", tags.len());

    tags.into_iter()
        .next()
        .ok_or_else(|| VenvError::NoReleases(url.to_string()))
}
