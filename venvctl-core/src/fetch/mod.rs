//! Fetching the virtualenv distribution.
//!
//! - `releases`: latest tag lookup against the release-listing API
//! - `downloader`: streaming download with progress and URL validation
//! - `extractor`: zip extraction
//! - `fetcher`: the idempotent "make sure it's on disk" workflow

pub mod downloader;
pub mod extractor;
pub mod fetcher;
pub mod releases;

pub use downloader::{download_file, DownloadPolicy, DownloadProgress};
pub use extractor::extract_zip;
pub use fetcher::ArchiveFetcher;
pub use releases::{fetch_latest_release, ReleaseTag};
