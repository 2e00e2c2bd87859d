//! Zip extraction for the downloaded virtualenv distribution.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, info};
use zip::result::ZipResult;

use crate::error::{Result, VenvError};
use crate::paths;

/// Extracts every entry of a zip archive into `dest_dir`.
///
/// Existing files are overwritten. Entries whose names would escape
/// `dest_dir` are skipped. Any failure, including I/O while writing an
/// entry, is returned.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    info!(
        "Extracting {} to {}",
        archive_path.display(),
        dest_dir.display()
    );

    paths::ensure_dir(dest_dir)?;
    extract_entries(archive_path, dest_dir).map_err(|source| VenvError::Extraction {
        archive: archive_path.to_path_buf(),
        source,
    })
}

fn extract_entries(archive_path: &Path, dest_dir: &Path) -> ZipResult<()> {
    let mut archive = zip::ZipArchive::new(File::open(archive_path)?)?;
    let mut written = 0usize;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            debug!("Skipping unsafe path in zip: {}", entry.name());
            continue;
        };
        let target = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        // Zipballs list a file before its directory entry now and then.
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        io::copy(&mut entry, &mut File::create(&target)?)?;

        #[cfg(unix)]
        set_unix_permissions(&target, entry.unix_mode())?;

        written += 1;
    }

    debug!("Extracted {} files", written);
    Ok(())
}

#[cfg(unix)]
fn set_unix_permissions(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        if mode & 0o111 != 0 {
            fs::set_permissions(path, fs::Permissions::from_mode(mode | 0o755))?;
        }
    }

    Ok(())
}
