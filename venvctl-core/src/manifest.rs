//! Install manifest persistence.
//!
//! Records which virtualenv release was downloaded into the home directory.
//! The manifest is informational: the distribution directory's existence,
//! not the manifest, decides whether a download is needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{IoContext, Result};
use crate::paths;

/// Current schema version for the manifest file.
const SCHEMA_VERSION: u32 = 1;

/// The distribution that was fetched and extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionInfo {
    /// Release tag name (may be empty if the listing omitted it).
    pub tag: String,
    /// Archive URL the distribution was downloaded from.
    pub archive_url: String,
    pub installed_at: DateTime<Utc>,
    /// Size of the downloaded archive in bytes.
    pub size_bytes: u64,
}

/// Root structure for the manifest file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallManifest {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    #[serde(default)]
    pub distribution: Option<DistributionInfo>,
}

impl Default for InstallManifest {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            distribution: None,
        }
    }
}

impl InstallManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly extracted distribution.
    pub fn mark_installed(&mut self, tag: String, archive_url: String, size_bytes: u64) {
        self.distribution = Some(DistributionInfo {
            tag,
            archive_url,
            installed_at: Utc::now(),
            size_bytes,
        });
    }
}

/// Loads the manifest.
///
/// If the manifest doesn't exist, returns a new empty manifest.
/// If it exists but is corrupted, logs a warning and returns empty.
pub fn load_manifest(path: &Path) -> Result<InstallManifest> {
    if !path.exists() {
        debug!("Manifest not found at {}, creating new", path.display());
        return Ok(InstallManifest::new());
    }

    let content = fs::read_to_string(path)
        .io_context(|| format!("Failed to read manifest from {}", path.display()))?;

    match serde_json::from_str::<InstallManifest>(&content) {
        Ok(mut manifest) => {
            if manifest.schema_version != SCHEMA_VERSION {
                info!(
                    "Manifest schema version {} differs from current {}, migrating",
                    manifest.schema_version, SCHEMA_VERSION
                );
                manifest.schema_version = SCHEMA_VERSION;
            }
            Ok(manifest)
        }
        Err(e) => {
            warn!(
                "Failed to parse manifest at {}: {}. Starting fresh.",
                path.display(),
                e
            );
            Ok(InstallManifest::new())
        }
    }
}

/// Saves the manifest, creating its parent directory if needed.
pub fn save_manifest(path: &Path, manifest: &InstallManifest) -> Result<()> {
    paths::ensure_parent_dir(path)?;

    let content = serde_json::to_string_pretty(manifest)
        .map_err(std::io::Error::from)
        .io_context(|| "Failed to serialize manifest".to_string())?;

    fs::write(path, content)
        .io_context(|| format!("Failed to write manifest to {}", path.display()))?;

    debug!("Saved manifest to {}", path.display());
    Ok(())
}
