//! Installs pip into an environment with the `get-pip.py` bootstrap script.

use std::path::Path;
use tracing::info;

use crate::config::Settings;
use crate::error::Result;
use crate::fetch::{download_file, DownloadPolicy};
use crate::paths;
use crate::runner::{CommandRunner, CommandSpec, ExecOptions};

/// Downloads the bootstrap script, then runs it with the environment's
/// interpreter.
///
/// The script only runs once the download has completed and the file is
/// flushed; a failed download never reaches the interpreter. Returns the
/// script's stdout.
pub async fn install_pip(
    settings: &Settings,
    client: &reqwest::Client,
    runner: &dyn CommandRunner,
    env_root: &Path,
) -> Result<String> {
    let script_path = settings.bootstrap_script_path();
    let policy = DownloadPolicy::from_settings(settings);

    download_file(
        client,
        &policy,
        &settings.bootstrap_url,
        &script_path,
        |_| {},
    )
    .await?;

    info!("Bootstrapping pip into {}", env_root.display());

    let command = CommandSpec::new(paths::python_path(env_root)).arg(&script_path);
    runner.run(&command, &ExecOptions::default()).await
}
