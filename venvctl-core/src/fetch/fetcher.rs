//! Ensures the virtualenv distribution is present on disk.

use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::downloader::{download_file, DownloadPolicy};
use super::extractor::extract_zip;
use super::releases::{fetch_latest_release, ReleaseTag};
use crate::config::Settings;
use crate::error::{IoContext, Result, VenvError};
use crate::manifest::{load_manifest, save_manifest};

/// Downloads and extracts the virtualenv distribution into
/// [`Settings::virtualenv_dir`].
pub struct ArchiveFetcher<'a> {
    settings: &'a Settings,
    client: &'a reqwest::Client,
}

impl<'a> ArchiveFetcher<'a> {
    pub fn new(settings: &'a Settings, client: &'a reqwest::Client) -> Self {
        Self { settings, client }
    }

    /// Returns true if the distribution directory exists.
    pub fn is_present(&self) -> bool {
        self.settings.virtualenv_dir().exists()
    }

    /// Makes sure the distribution is extracted.
    ///
    /// Once the distribution directory exists this returns immediately and
    /// never downloads again, even if a newer release is available.
    /// Otherwise the latest release's zip is downloaded and extracted, and
    /// the first failing step aborts the rest. Recording the release in the
    /// manifest afterwards only logs on failure.
    pub async fn ensure_distribution(&self) -> Result<()> {
        let dist_dir = self.settings.virtualenv_dir();
        if dist_dir.exists() {
            debug!("virtualenv already present at {}", dist_dir.display());
            return Ok(());
        }

        let release = fetch_latest_release(self.client, &self.settings.releases_url).await?;
        info!(
            "Installing virtualenv {} from {}",
            release.name, release.zipball_url
        );

        let archive_path = self.settings.archive_path();
        let policy = DownloadPolicy::from_settings(self.settings);
        let bytes_downloaded = download_file(
            self.client,
            &policy,
            &release.zipball_url,
            &archive_path,
            |progress| {
                if let Some(percent) = progress.percent {
                    debug!("virtualenv download progress: {:.1}%", percent);
                }
            },
        )
        .await?;

        if let Err(e) = extract_zip(&archive_path, &dist_dir) {
            // Leave no half-extracted directory behind, or the next call
            // would treat it as installed.
            if let Err(cleanup) = std::fs::remove_dir_all(&dist_dir) {
                warn!("Failed to clean up {}: {}", dist_dir.display(), cleanup);
            }
            return Err(e);
        }

        if let Err(e) = tokio::fs::remove_file(&archive_path).await {
            warn!("Failed to clean up archive: {}", e);
        }

        if let Err(e) = self.record_install(release, bytes_downloaded) {
            warn!("Failed to update install manifest: {}", e);
        }

        info!("virtualenv extracted to {}", dist_dir.display());
        Ok(())
    }

    fn record_install(&self, release: ReleaseTag, bytes_downloaded: u64) -> Result<()> {
        let manifest_path = self.settings.manifest_path();
        let mut manifest = load_manifest(&manifest_path)?;
        manifest.mark_installed(release.name, release.zipball_url, bytes_downloaded);
        save_manifest(&manifest_path, &manifest)
    }

    /// Returns the single directory the archive extracted into.
    ///
    /// GitHub zipballs wrap the tree in one `{owner}-{repo}-{sha}` directory.
    /// If there are several, the first in sorted order wins.
    pub fn locate_distribution(&self) -> Result<PathBuf> {
        let dist_dir = self.settings.virtualenv_dir();
        let entries = std::fs::read_dir(&dist_dir)
            .io_context(|| format!("Failed to read {}", dist_dir.display()))?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.io_context(|| format!("Failed to read {}", dist_dir.display()))?;
            if entry.path().is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        dirs.into_iter()
            .next()
            .ok_or(VenvError::EmptyDistribution(dist_dir))
    }
}
