//! Creates virtual environments with the downloaded virtualenv distribution.

use std::path::Path;
use tracing::{debug, info};

use crate::bootstrap::install_pip;
use crate::config::Settings;
use crate::error::Result;
use crate::fetch::ArchiveFetcher;
use crate::paths;
use crate::runner::{CommandRunner, CommandSpec, ExecOptions};

/// Result of [`ensure_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The environment's interpreter was already there; nothing ran.
    AlreadyInstalled,
    /// The environment was created; carries the pip bootstrap's stdout.
    Installed(String),
}

/// Creates (or re-creates over) a virtual environment and installs pip.
///
/// Steps, each gated on the previous one succeeding:
/// 1. make sure the virtualenv distribution is extracted,
/// 2. run `<system python> <dist>/<entry script> <env> <creator args>`,
/// 3. bootstrap pip into the new environment.
///
/// `env_path` defaults to [`Settings::default_env_dir`]. Returns the pip
/// bootstrap's stdout.
pub async fn install_env(
    settings: &Settings,
    client: &reqwest::Client,
    runner: &dyn CommandRunner,
    env_path: Option<&Path>,
) -> Result<String> {
    let env_root = settings.env_dir_or_default(env_path);

    let fetcher = ArchiveFetcher::new(settings, client);
    fetcher.ensure_distribution().await?;
    let dist_dir = fetcher.locate_distribution()?;

    info!("Creating virtual environment at {}", env_root.display());

    let command = CommandSpec::new(&settings.system_python)
        .arg(dist_dir.join(&settings.entry_script))
        .arg(&env_root)
        .args(&settings.creator_args);
    runner.run(&command, &ExecOptions::default()).await?;

    debug!("Virtual environment created, installing pip");
    install_pip(settings, client, runner, &env_root).await
}

/// Ensures a virtual environment exists, creating it if needed.
///
/// Short-circuits when the environment's interpreter is already present,
/// so repeated calls download, extract and install at most once.
pub async fn ensure_env(
    settings: &Settings,
    client: &reqwest::Client,
    runner: &dyn CommandRunner,
    env_path: Option<&Path>,
) -> Result<EnsureOutcome> {
    let env_root = settings.env_dir_or_default(env_path);
    if paths::is_env_installed(&env_root) {
        debug!(
            "Virtual environment already exists at {}",
            env_root.display()
        );
        return Ok(EnsureOutcome::AlreadyInstalled);
    }

    install_env(settings, client, runner, Some(&env_root))
        .await
        .map(EnsureOutcome::Installed)
}
