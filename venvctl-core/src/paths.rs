//! Conventional layout inside a virtual environment root.
//!
//! - Unix: `{env}/bin/python`, installed tools under `{env}/bin/`
//! - Windows: `{env}/Scripts/python.exe`, installed tools under `{env}/Scripts/`

use std::path::{Path, PathBuf};

use crate::error::{IoContext, Result};

/// Returns the directory holding the environment's executables.
pub fn bin_dir(env_root: &Path) -> PathBuf {
    #[cfg(windows)]
    {
        env_root.join("Scripts")
    }
    #[cfg(not(windows))]
    {
        env_root.join("bin")
    }
}

/// Returns the path to the Python executable in a virtual environment.
pub fn python_path(env_root: &Path) -> PathBuf {
    executable_path(env_root, "python")
}

/// Returns the path to the pip executable in a virtual environment.
pub fn pip_path(env_root: &Path) -> PathBuf {
    executable_path(env_root, "pip")
}

/// Returns the path of a named executable inside the environment's bin dir.
///
/// On Windows `.exe` is appended when the name has no extension.
pub fn executable_path(env_root: &Path, name: &str) -> PathBuf {
    let path = bin_dir(env_root).join(name);

    #[cfg(windows)]
    {
        if path.extension().is_none() {
            return path.with_extension("exe");
        }
    }

    path
}

/// Creates `dir` and any missing parents. Existing directories are fine.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .io_context(|| format!("Failed to create directory: {}", dir.display()))
}

/// Creates the parent directory of `path`, if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Returns true once the environment contains its interpreter.
pub fn is_env_installed(env_root: &Path) -> bool {
    python_path(env_root).exists()
}
