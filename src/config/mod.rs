// src/config/mod.rs

//! Configuration loading and validation for detect-runner.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate values the runner relies on (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default, DEFAULT_CONFIG_FILE};
pub use model::{ConfigFile, DetectSection, RawConfigFile, RunnerSection, DEFAULT_DOWNLOAD_URL};
pub use validate::{parse_duration, validate_config};
