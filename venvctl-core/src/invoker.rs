//! Runs pip, scripts and installed binaries inside an environment.
//!
//! # Caller responsibility
//!
//! Package names, script paths and binary names are passed through exactly
//! as given. Commands are built as argument lists, so no shell ever sees
//! them and shell metacharacters are inert, but nothing here validates the
//! values themselves: a package spec may point pip at any URL or local
//! path, and a binary name containing `..` or separators can reach outside
//! the environment's bin directory. Sanitize untrusted input before calling.

use std::ffi::OsString;
use std::path::Path;
use tracing::info;

use crate::config::Settings;
use crate::error::Result;
use crate::paths;
use crate::runner::{CommandRunner, CommandSpec, ExecOptions};

/// Options for script and binary invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokeOptions {
    /// Arguments appended after the script path or binary.
    pub args: Vec<OsString>,
    /// Process options (working directory, environment, timeout).
    pub exec: ExecOptions,
}

impl InvokeOptions {
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_exec(mut self, exec: ExecOptions) -> Self {
        self.exec = exec;
        self
    }
}

/// Installs a package with the environment's pip.
///
/// Runs `<env>/bin/pip install <package>`; `package` is forwarded verbatim
/// as a single argument. `env` defaults to [`Settings::default_env_dir`].
pub async fn install_package(
    settings: &Settings,
    runner: &dyn CommandRunner,
    package: &str,
    env: Option<&Path>,
) -> Result<String> {
    let env_root = settings.env_dir_or_default(env);
    info!("Installing {} into {}", package, env_root.display());

    let command = CommandSpec::new(paths::pip_path(&env_root))
        .arg("install")
        .arg(package);
    runner.run(&command, &ExecOptions::default()).await
}

/// Runs a script with the environment's interpreter and returns its stdout.
///
/// Runs `<env>/bin/python <script> <options.args…>`.
pub async fn execute_script(
    settings: &Settings,
    runner: &dyn CommandRunner,
    script: &Path,
    options: &InvokeOptions,
    env: Option<&Path>,
) -> Result<String> {
    let env_root = settings.env_dir_or_default(env);
    let command = CommandSpec::new(paths::python_path(&env_root))
        .arg(script)
        .args(&options.args);
    runner.run(&command, &options.exec).await
}

/// Runs a binary from the environment's bin directory and returns its stdout.
///
/// Runs `<env>/bin/<bin> <options.args…>`.
pub async fn execute_bin(
    settings: &Settings,
    runner: &dyn CommandRunner,
    bin: &str,
    options: &InvokeOptions,
    env: Option<&Path>,
) -> Result<String> {
    let env_root = settings.env_dir_or_default(env);
    let command = CommandSpec::new(paths::executable_path(&env_root, bin)).args(&options.args);
    runner.run(&command, &options.exec).await
}
