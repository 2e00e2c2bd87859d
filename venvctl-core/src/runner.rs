//! Child process execution.
//!
//! Every external tool venvctl drives (the system interpreter, virtualenv,
//! pip, scripts and binaries inside an environment) goes through the
//! [`CommandRunner`] trait. Commands are structured argument lists handed
//! straight to the OS; no shell is involved.

use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, VenvError};

// ============================================================================
// Command description
// ============================================================================

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Options applied to a child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Working directory. Inherits the caller's when `None`.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables, layered over the inherited environment.
    pub env: HashMap<String, String>,
    /// Kill the child after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl ExecOptions {
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ============================================================================
// Runner trait
// ============================================================================

/// Runs a command and yields its captured standard output.
///
/// Implementations must fail with [`VenvError::Spawn`] when the process
/// cannot be started and [`VenvError::CommandFailed`] (carrying stderr) when
/// it exits unsuccessfully. Output is returned untrimmed.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec, options: &ExecOptions) -> Result<String>;
}

/// Runs commands as real child processes via tokio.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandSpec, options: &ExecOptions) -> Result<String> {
        let rendered = command.to_string();
        info!(command = %rendered, cwd = ?options.cwd, "Executing command");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&options.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &options.cwd {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|source| VenvError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        let output = match options.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output,
                // Dropping the future drops the child, which kills it.
                Err(_) => {
                    return Err(VenvError::TimedOut {
                        command: rendered,
                        timeout: limit,
                    })
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|source| VenvError::Spawn {
            command: rendered.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            debug!(command = %rendered, code = ?output.status.code(), "Command failed");
            return Err(VenvError::CommandFailed {
                command: rendered,
                code: output.status.code(),
                stderr,
            });
        }

        debug!(command = %rendered, "Command completed successfully");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
