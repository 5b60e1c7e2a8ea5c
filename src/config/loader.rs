// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// File name picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "detect-runner.toml";

/// Parse a TOML file into a [`RawConfigFile`] without validating it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading config file");
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

/// Parse and validate.
///
/// Missing sections and keys take their defaults; the download URL, the
/// drain grace, property shapes and environment keys are then checked.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    ConfigFile::try_from(load_from_path(path)?)
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
/// used when present and built-in defaults otherwise.
pub fn load_or_default(path: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = path {
        return load_and_validate(path);
    }

    let fallback = default_config_path();
    if fallback.is_file() {
        load_and_validate(fallback)
    } else {
        debug!("no config file; using defaults");
        Ok(ConfigFile::default())
    }
}
