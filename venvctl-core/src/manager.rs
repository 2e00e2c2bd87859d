//! High-level entry point tying settings, HTTP client and process runner
//! together.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::error::{Result, VenvError};
use crate::fetch::ArchiveFetcher;
use crate::installer::{self, EnsureOutcome};
use crate::interpreter;
use crate::invoker::{self, InvokeOptions};
use crate::manifest::{load_manifest, DistributionInfo};
use crate::paths;
use crate::runner::{CommandRunner, ProcessRunner};

/// Snapshot of what is installed under the home directory.
#[derive(Debug, Clone)]
pub struct EnvStatus {
    /// Whether the virtualenv distribution has been extracted.
    pub distribution_present: bool,
    /// The fetched release, if the manifest recorded one.
    pub distribution: Option<DistributionInfo>,
    /// Environment root that was inspected.
    pub env_dir: PathBuf,
    /// Whether that environment has its interpreter.
    pub env_installed: bool,
}

/// Installs and drives virtual environments.
///
/// Every operation is sequential: each step starts only after the previous
/// one succeeded, and the first failure is returned. Nothing is locked, so
/// two managers sharing a home directory must not run concurrently.
pub struct VirtualEnvManager {
    settings: Settings,
    client: reqwest::Client,
    runner: Arc<dyn CommandRunner>,
}

impl VirtualEnvManager {
    /// Creates a manager that spawns real processes.
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_runner(settings, Arc::new(ProcessRunner))
    }

    /// Creates a manager with a custom command runner.
    pub fn with_runner(settings: Settings, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|source| VenvError::Network {
                url: String::new(),
                source,
            })?;

        info!(
            "VirtualEnvManager initialized. Home dir: {}",
            settings.home_dir.display()
        );

        Ok(Self {
            settings,
            client,
            runner,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Creates a virtual environment at `env_path` (or the default) and
    /// installs pip into it. Returns the pip bootstrap's stdout.
    pub async fn install_env(&self, env_path: Option<&Path>) -> Result<String> {
        installer::install_env(&self.settings, &self.client, self.runner.as_ref(), env_path).await
    }

    /// Like [`Self::install_env`], but does nothing if the environment
    /// already has its interpreter.
    pub async fn ensure_env(&self, env_path: Option<&Path>) -> Result<EnsureOutcome> {
        installer::ensure_env(&self.settings, &self.client, self.runner.as_ref(), env_path).await
    }

    /// Installs a package with pip. See [`invoker`] for input caveats.
    pub async fn install_package(&self, package: &str, env: Option<&Path>) -> Result<String> {
        invoker::install_package(&self.settings, self.runner.as_ref(), package, env).await
    }

    /// Runs a script with the environment's interpreter. See [`invoker`] for
    /// input caveats.
    pub async fn execute_script(
        &self,
        script: &Path,
        options: &InvokeOptions,
        env: Option<&Path>,
    ) -> Result<String> {
        invoker::execute_script(&self.settings, self.runner.as_ref(), script, options, env).await
    }

    /// Runs a binary from the environment. See [`invoker`] for input caveats.
    pub async fn execute_bin(
        &self,
        bin: &str,
        options: &InvokeOptions,
        env: Option<&Path>,
    ) -> Result<String> {
        invoker::execute_bin(&self.settings, self.runner.as_ref(), bin, options, env).await
    }

    /// Version of the system-wide interpreter (not the environment's).
    pub async fn system_interpreter_version(&self) -> Result<String> {
        interpreter::system_interpreter_version(&self.settings, self.runner.as_ref()).await
    }

    /// Reports what is installed, without touching the network.
    pub fn status(&self, env: Option<&Path>) -> Result<EnvStatus> {
        let env_dir = self.settings.env_dir_or_default(env);
        let manifest = load_manifest(&self.settings.manifest_path())?;

        Ok(EnvStatus {
            distribution_present: ArchiveFetcher::new(&self.settings, &self.client).is_present(),
            distribution: manifest.distribution,
            env_installed: paths::is_env_installed(&env_dir),
            env_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{local_settings, zip_bytes, RecordingRunner};
    use std::ffi::OsString;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_install_then_install_package() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "name": "1.11.6", "zipball_url": format!("{}/zipball", server.uri()) },
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/zipball"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(zip_bytes(&[(
                "pypa-virtualenv-1a2b3c/virtualenv.py",
                b"# virtualenv",
            )])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/get-pip.py"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# get-pip"))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::new());
        let manager = VirtualEnvManager::with_runner(
            local_settings(temp_dir.path(), &server),
            runner.clone(),
        )
        .unwrap();

        manager.install_env(None).await.unwrap();
        manager.install_package("zope.interface", None).await.unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 3);
        let pip = &commands[2];
        assert_eq!(pip.program, paths::pip_path(&manager.settings().default_env_dir()));
        assert_eq!(
            pip.args,
            vec![OsString::from("install"), OsString::from("zope.interface")]
        );

        let status = manager.status(None).unwrap();
        assert!(status.distribution_present);
        assert_eq!(status.distribution.unwrap().tag, "1.11.6");
        // The recording runner never creates the interpreter.
        assert!(!status.env_installed);
    }

    #[tokio::test]
    async fn test_execute_script_uses_default_env() {
        let temp_dir = TempDir::new().unwrap();
        let runner = Arc::new(RecordingRunner::new());
        let manager = VirtualEnvManager::with_runner(
            Settings::default().with_home_dir(temp_dir.path()),
            runner.clone(),
        )
        .unwrap();

        manager
            .execute_script(Path::new("/tmp/foo.py"), &InvokeOptions::default(), None)
            .await
            .unwrap();

        let commands = runner.commands();
        assert_eq!(
            commands[0].program,
            paths::python_path(&temp_dir.path().join("env"))
        );
        assert_eq!(commands[0].args, vec![OsString::from("/tmp/foo.py")]);
    }

    #[tokio::test]
    async fn test_system_interpreter_version() {
        let runner = Arc::new(RecordingRunner::new().reply(Ok("Python 3.11.4".to_string())));
        let manager = VirtualEnvManager::with_runner(Settings::default(), runner).unwrap();
        assert_eq!(manager.system_interpreter_version().await.unwrap(), "3.11.4");
    }

    #[test]
    fn test_status_on_empty_home() {
        let temp_dir = TempDir::new().unwrap();
        let manager =
            VirtualEnvManager::new(Settings::default().with_home_dir(temp_dir.path())).unwrap();

        let status = manager.status(None).unwrap();
        assert!(!status.distribution_present);
        assert!(status.distribution.is_none());
        assert!(!status.env_installed);
        assert_eq!(status.env_dir, temp_dir.path().join("env"));
    }
}
