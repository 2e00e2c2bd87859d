//! CLI definitions using clap derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// venvctl - install and drive Python virtual environments
#[derive(Parser, Debug)]
#[command(name = "venvctl", author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, env = "VENVCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Home directory for downloads and the default environment
    #[arg(long, global = true, env = "VENVCTL_HOME")]
    pub home: Option<PathBuf>,

    /// System interpreter used to run virtualenv
    #[arg(long, global = true)]
    pub python: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a virtual environment and bootstrap pip into it
    InstallEnv {
        /// Environment root (defaults to `<home>/env`)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Create the environment only if it has no interpreter yet
    EnsureEnv {
        /// Environment root (defaults to `<home>/env`)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Install a package with the environment's pip
    ///
    /// The package spec is passed to pip unvalidated.
    InstallPackage {
        /// Package spec, e.g. `zope.interface` or `requests>=2`
        name: String,
        #[arg(long)]
        env: Option<PathBuf>,
    },

    /// Run a script with the environment's interpreter
    RunScript {
        script: PathBuf,
        #[arg(long)]
        env: Option<PathBuf>,
        /// Working directory for the script
        #[arg(long)]
        cwd: Option<PathBuf>,
        /// Arguments passed to the script
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Run a binary from the environment's bin directory
    RunBin {
        bin: String,
        #[arg(long)]
        env: Option<PathBuf>,
        /// Working directory for the binary
        #[arg(long)]
        cwd: Option<PathBuf>,
        /// Arguments passed to the binary
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print the system interpreter's version
    PythonVersion,

    /// Show what is installed
    Status {
        #[arg(long)]
        env: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_script_trailing_args() {
        let cli = Cli::try_parse_from([
            "venvctl",
            "run-script",
            "main.py",
            "--env",
            "/srv/env",
            "--",
            "--flag",
            "value",
        ])
        .unwrap();

        match cli.command {
            Commands::RunScript {
                script, env, args, ..
            } => {
                assert_eq!(script, PathBuf::from("main.py"));
                assert_eq!(env, Some(PathBuf::from("/srv/env")));
                assert_eq!(args, vec!["--flag", "value"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_global_home() {
        let cli =
            Cli::try_parse_from(["venvctl", "install-package", "zope.interface", "--home", "/h"])
                .unwrap();
        assert_eq!(cli.home, Some(PathBuf::from("/h")));
        assert!(matches!(
            cli.command,
            Commands::InstallPackage { ref name, .. } if name == "zope.interface"
        ));
    }
}
