// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Required environment variable is not set: {0}")]
    MissingEnvironment(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Detect executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("Could not obtain Detect from {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Detect thread was interrupted")]
    Interrupted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DetectError>;
