//! Settings for venvctl.
//!
//! Settings are persisted as JSON. Every field has a default, so a partial
//! file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// =============================================================================
// Defaults
// =============================================================================

/// Subdirectory name under the OS temp folder.
const VENVCTL_TEMP_DIR: &str = "venvctl";

/// Tags of the virtualenv repository, newest first.
pub const DEFAULT_RELEASES_URL: &str = "https://api.github.com/repos/pypa/virtualenv/tags";

/// Bootstrap script that installs pip into a fresh environment.
pub const DEFAULT_BOOTSTRAP_URL: &str = "https://bootstrap.pypa.io/get-pip.py";

/// Default environment directory name under the home directory.
pub const DEFAULT_ENV_DIR_NAME: &str = "env";

fn default_home_dir() -> PathBuf {
    std::env::temp_dir().join(VENVCTL_TEMP_DIR)
}

fn default_user_agent() -> String {
    format!("venvctl/{}", env!("CARGO_PKG_VERSION"))
}

/// Returns the default settings file location.
///
/// Path: `{config_dir}/venvctl/settings.json`, or `None` when the platform
/// has no config directory.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("venvctl").join("settings.json"))
}

// =============================================================================
// Settings
// =============================================================================

/// Application settings - persisted as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the virtualenv distribution, downloads and the
    /// default environment.
    pub home_dir: PathBuf,

    /// Release-listing endpoint; the first entry's `zipball_url` is used.
    pub releases_url: String,

    /// Location of the pip bootstrap script.
    pub bootstrap_url: String,

    /// System-wide interpreter used to run virtualenv and query versions.
    pub system_python: String,

    /// Entry script inside the extracted virtualenv distribution.
    pub entry_script: String,

    /// Extra arguments passed to the entry script after the target path.
    pub creator_args: Vec<String>,

    /// User-Agent sent with every request (GitHub rejects requests without one).
    pub user_agent: String,

    /// Hosts downloads may come from (subdomains included).
    pub allowed_domains: Vec<String>,

    /// Reject non-HTTPS download URLs.
    pub require_https: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home_dir: default_home_dir(),
            releases_url: DEFAULT_RELEASES_URL.to_string(),
            bootstrap_url: DEFAULT_BOOTSTRAP_URL.to_string(),
            system_python: "python".to_string(),
            entry_script: "virtualenv.py".to_string(),
            // setuptools/pip are bootstrapped separately
            creator_args: vec!["--no-setuptools".to_string()],
            user_agent: default_user_agent(),
            allowed_domains: vec![
                "github.com".to_string(),
                "githubusercontent.com".to_string(),
                "pypa.io".to_string(),
            ],
            require_https: true,
        }
    }
}

impl Settings {
    /// Load settings from the default location, using defaults for missing values.
    pub fn load() -> Self {
        match default_settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from a JSON file.
    ///
    /// If the file doesn't exist or can't be parsed, returns defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!("Settings not found at {}, using defaults", path.display());
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read settings at {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Settings>(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(
                    "Failed to parse settings at {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Returns a copy rooted at a different home directory.
    pub fn with_home_dir(mut self, home_dir: impl Into<PathBuf>) -> Self {
        self.home_dir = home_dir.into();
        self
    }

    /// Directory the virtualenv distribution is extracted into.
    ///
    /// Path: `{home}/.virtualenv/`
    pub fn virtualenv_dir(&self) -> PathBuf {
        self.home_dir.join(".virtualenv")
    }

    /// Where the distribution zip is downloaded to.
    ///
    /// Path: `{home}/virtualenv.zip`
    pub fn archive_path(&self) -> PathBuf {
        self.home_dir.join("virtualenv.zip")
    }

    /// Where the pip bootstrap script is downloaded to.
    ///
    /// Path: `{home}/get-pip.py`
    pub fn bootstrap_script_path(&self) -> PathBuf {
        self.home_dir.join("get-pip.py")
    }

    /// Path: `{home}/manifest.json`
    pub fn manifest_path(&self) -> PathBuf {
        self.home_dir.join("manifest.json")
    }

    /// Environment used when callers don't pass one.
    ///
    /// Path: `{home}/env`
    pub fn default_env_dir(&self) -> PathBuf {
        self.home_dir.join(DEFAULT_ENV_DIR_NAME)
    }

    /// Resolves an optional caller-supplied environment root.
    pub fn env_dir_or_default(&self, env: Option<&Path>) -> PathBuf {
        env.map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_env_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_env_dir_has_no_trailing_whitespace() {
        let settings = Settings::default();
        let env = settings.default_env_dir();
        let env_str = env.to_string_lossy();
        assert_eq!(env_str.trim_end(), env_str);
        assert!(env.ends_with("env"));
    }

    #[test]
    fn test_derived_paths_are_under_home() {
        let settings = Settings::default().with_home_dir("/opt/venvctl");
        assert_eq!(settings.virtualenv_dir(), Path::new("/opt/venvctl/.virtualenv"));
        assert_eq!(settings.archive_path(), Path::new("/opt/venvctl/virtualenv.zip"));
        assert_eq!(
            settings.bootstrap_script_path(),
            Path::new("/opt/venvctl/get-pip.py")
        );
        assert_eq!(settings.manifest_path(), Path::new("/opt/venvctl/manifest.json"));
        assert_eq!(settings.default_env_dir(), Path::new("/opt/venvctl/env"));
    }

    #[test]
    fn test_env_dir_or_default() {
        let settings = Settings::default().with_home_dir("/opt/venvctl");
        assert_eq!(
            settings.env_dir_or_default(None),
            Path::new("/opt/venvctl/env")
        );
        assert_eq!(
            settings.env_dir_or_default(Some(Path::new("/srv/py"))),
            Path::new("/srv/py")
        );
    }

    #[test]
    fn test_default_creator_args() {
        let settings = Settings::default();
        assert_eq!(settings.creator_args, vec!["--no-setuptools"]);
        assert!(settings.require_https);
        assert!(settings.user_agent.starts_with("venvctl/"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp_dir.path().join("missing.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, r#"{ "system_python": "python3" }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.system_python, "python3");
        assert_eq!(settings.releases_url, DEFAULT_RELEASES_URL);
    }

    #[test]
    fn test_load_corrupt_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
