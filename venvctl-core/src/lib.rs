//! venvctl Core Library
//!
//! Downloads the virtualenv tool, creates Python virtual environments with
//! it, bootstraps pip into them, and runs packages, scripts and binaries
//! inside them. It includes:
//!
//! - Process execution behind the [`CommandRunner`] trait
//! - Latest-release lookup, download and extraction of virtualenv
//! - pip bootstrapping via `get-pip.py`
//! - Environment creation (`install_env` / `ensure_env`)
//! - Package installs, script and binary invocation
//! - System interpreter version queries
//!
//! # Example
//!
//! ```ignore
//! use venvctl_core::{Settings, VirtualEnvManager};
//!
//! let manager = VirtualEnvManager::new(Settings::load())?;
//! manager.ensure_env(None).await?;
//! manager.install_package("zope.interface", None).await?;
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod fetch;
pub mod installer;
pub mod interpreter;
pub mod invoker;
pub mod manager;
pub mod manifest;
pub mod paths;
pub mod runner;

#[cfg(test)]
mod testing;

pub use config::Settings;
pub use error::{Result, VenvError};
pub use installer::EnsureOutcome;
pub use invoker::InvokeOptions;
pub use manager::{EnvStatus, VirtualEnvManager};
pub use manifest::{DistributionInfo, InstallManifest};
pub use runner::{CommandRunner, CommandSpec, ExecOptions, ProcessRunner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
