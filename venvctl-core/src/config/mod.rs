//! Configuration module for venvctl.
//!
//! Manages settings stored as JSON in the user's config directory.

mod settings;

pub use settings::{
    default_settings_path, Settings, DEFAULT_BOOTSTRAP_URL, DEFAULT_ENV_DIR_NAME,
    DEFAULT_RELEASES_URL,
};
