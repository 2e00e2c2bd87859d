//! Queries the system-wide Python interpreter.

use tracing::debug;

use crate::config::Settings;
use crate::error::Result;
use crate::runner::{CommandRunner, CommandSpec, ExecOptions};

/// Length of the `"Python "` prefix in `python --version` output.
const VERSION_OFFSET: usize = 7;

/// Returns the version of the system interpreter, e.g. `"3.11.4"`.
///
/// Runs `<system python> --version` and takes everything after the first
/// seven characters of the trimmed output. Output in any other shape yields
/// a meaningless (possibly empty) string rather than an error; only a
/// failing process is reported as one. Interpreters that print their
/// version to stderr (Python 2) produce an empty string.
pub async fn system_interpreter_version(
    settings: &Settings,
    runner: &dyn CommandRunner,
) -> Result<String> {
    let command = CommandSpec::new(&settings.system_python).arg("--version");
    let stdout = runner.run(&command, &ExecOptions::default()).await?;
    let version = parse_version(&stdout);
    debug!("System interpreter version: {:?}", version);
    Ok(version)
}

fn parse_version(output: &str) -> String {
    output
        .trim()
        .chars()
        .skip(VERSION_OFFSET)
        .collect()
}
