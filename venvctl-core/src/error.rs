//! Error type shared by every venvctl operation.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while installing or driving a virtual environment.
#[derive(Debug, Error)]
pub enum VenvError {
    /// The child process could not be started at all.
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The child process ran but exited unsuccessfully.
    #[error("`{command}` failed (exit code: {}): {stderr}", display_code(.code))]
    CommandFailed {
        command: String,
        /// Exit code, or `None` when the process was killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Malformed release listing from {url}: {source}")]
    MalformedReleases {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Release listing from {0} is empty")]
    NoReleases(String),

    #[error("Download URL rejected: {0}")]
    UrlRejected(String),

    #[error("Failed to extract {}: {source}", .archive.display())]
    Extraction {
        archive: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("No extracted distribution found in {}", .0.display())]
    EmptyDistribution(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

impl VenvError {
    /// Returns the captured stderr for process failures.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, VenvError>;

/// Attaches a context message to I/O errors.
pub(crate) trait IoContext<T> {
    fn io_context<F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context<F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|source| VenvError::Io {
            context: context(),
            source,
        })
    }
}
