//! venvctl command-line application
//!
//! Installs virtualenv, creates environments with it and runs things inside
//! them.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use venvctl_core::{EnsureOutcome, ExecOptions, InvokeOptions, Settings, VirtualEnvManager};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();
    tracing::debug!("Starting venvctl v{}", venvctl_core::VERSION);

    let manager = VirtualEnvManager::new(load_settings(&cli))
        .context("Failed to initialize venvctl")?;

    match cli.command {
        Commands::InstallEnv { path } => {
            let output = manager.install_env(path.as_deref()).await?;
            print!("{output}");
        }
        Commands::EnsureEnv { path } => match manager.ensure_env(path.as_deref()).await? {
            EnsureOutcome::AlreadyInstalled => {
                let env = manager.settings().env_dir_or_default(path.as_deref());
                println!("Environment already installed at {}", env.display());
            }
            EnsureOutcome::Installed(output) => print!("{output}"),
        },
        Commands::InstallPackage { name, env } => {
            let output = manager.install_package(&name, env.as_deref()).await?;
            print!("{output}");
        }
        Commands::RunScript {
            script,
            env,
            cwd,
            args,
        } => {
            let options = invoke_options(cwd, args);
            let output = manager
                .execute_script(&script, &options, env.as_deref())
                .await?;
            print!("{output}");
        }
        Commands::RunBin {
            bin,
            env,
            cwd,
            args,
        } => {
            let options = invoke_options(cwd, args);
            let output = manager.execute_bin(&bin, &options, env.as_deref()).await?;
            print!("{output}");
        }
        Commands::PythonVersion => {
            println!("{}", manager.system_interpreter_version().await?);
        }
        Commands::Status { env } => {
            let status = manager.status(env.as_deref())?;
            println!("Home:         {}", manager.settings().home_dir.display());
            match status.distribution {
                Some(info) => println!(
                    "virtualenv:   {} (from {}, {})",
                    info.tag,
                    info.archive_url,
                    info.installed_at.format("%Y-%m-%d %H:%M UTC")
                ),
                None if status.distribution_present => println!("virtualenv:   present"),
                None => println!("virtualenv:   not installed"),
            }
            println!(
                "Environment:  {} ({})",
                status.env_dir.display(),
                if status.env_installed {
                    "installed"
                } else {
                    "not installed"
                }
            );
        }
    }

    Ok(())
}

const DEFAULT_LOG_FILTER: &str = "venvctl=debug,venvctl_core=debug,info";

/// `RUST_LOG` wins when set and valid; otherwise the defaults apply.
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Settings file first, then command-line overrides.
fn load_settings(cli: &Cli) -> Settings {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    if let Some(home) = &cli.home {
        settings.home_dir = home.clone();
    }
    if let Some(python) = &cli.python {
        settings.system_python = python.clone();
    }

    settings
}

fn invoke_options(cwd: Option<std::path::PathBuf>, args: Vec<String>) -> InvokeOptions {
    let exec = ExecOptions {
        cwd,
        ..ExecOptions::default()
    };
    InvokeOptions::default().with_args(args).with_exec(exec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_defaults_without_rust_log() {
        let filter = env_filter(None).to_string();
        assert!(filter.contains("venvctl=debug"));
        assert!(filter.contains("venvctl_core=debug"));
        assert!(filter.contains("info"));
    }

    #[test]
    fn test_env_filter_uses_rust_log_verbatim() {
        let filter = env_filter(Some("venvctl_core=trace,error")).to_string();
        assert!(filter.contains("venvctl_core=trace"));
        assert!(filter.contains("error"));
        assert!(!filter.contains("venvctl=debug"));
    }

    #[test]
    fn test_env_filter_invalid_rust_log_falls_back() {
        let filter = env_filter(Some("venvctl_core=notalevel")).to_string();
        assert!(filter.contains("venvctl=debug"));
    }

    #[test]
    fn test_cli_flags_override_settings_file() {
        let cli = Cli::parse_from([
            "venvctl",
            "--config",
            "/nonexistent/venvctl/settings.json",
            "--home",
            "/srv/venvctl",
            "--python",
            "python3",
            "python-version",
        ]);

        let settings = load_settings(&cli);
        assert_eq!(settings.home_dir, std::path::PathBuf::from("/srv/venvctl"));
        assert_eq!(settings.system_python, "python3");
    }
}
