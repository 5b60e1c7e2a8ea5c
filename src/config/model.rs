// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::LogLevel;

/// Used when neither the config, the CLI nor `DETECT_DOWNLOAD_URL` name one.
pub const DEFAULT_DOWNLOAD_URL: &str =
    "https://sig-repo.synopsys.com/bds-integrations-release/com/synopsys/integration/synopsys-detect/";

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [runner]
/// java_home = "/opt/jdk-17"
/// tools_directory = "/var/lib/detect"
/// log_level = "info"
/// drain_grace = "5s"
///
/// [detect]
/// properties = ["--detect.source.path=/tmp/build"]
///
/// [environment]
/// WORKSPACE = "/tmp/build"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub detect: DetectSection,

    /// Variables overlaid onto the host environment for the run.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// Java home; `<java_home>/bin/java` launches the jar. If `None`,
    /// `JAVA_HOME` from the environment is used, then plain `java`.
    #[serde(default)]
    pub java_home: Option<PathBuf>,

    /// Where the Detect jar is cached and the default script lives.
    #[serde(default)]
    pub tools_directory: Option<PathBuf>,

    #[serde(default = "default_download_url")]
    pub download_url: String,

    /// Build-log level; also forwarded to Detect.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Duration string (e.g. `"5s"`, `"250ms"`) bounding how long output is
    /// drained after the process exits.
    #[serde(default = "default_drain_grace")]
    pub drain_grace: String,

    /// Host engine version reported to Detect.
    #[serde(default)]
    pub host_version: Option<String>,
}

fn default_download_url() -> String {
    DEFAULT_DOWNLOAD_URL.to_string()
}

fn default_drain_grace() -> String {
    "5s".to_string()
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            java_home: None,
            tools_directory: None,
            download_url: default_download_url(),
            log_level: LogLevel::default(),
            drain_grace: default_drain_grace(),
            host_version: None,
        }
    }
}

/// `[detect]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DetectSection {
    /// Caller-supplied jar. Mutually exclusive with `script`.
    #[serde(default)]
    pub jar: Option<PathBuf>,

    /// Caller-supplied script (air-gapped mode).
    #[serde(default)]
    pub script: Option<PathBuf>,

    /// Detect properties, passed in order (`--key=value`).
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub runner: RunnerSection,
    pub detect: DetectSection,
    pub environment: BTreeMap<String, String>,
    drain_grace: Duration,
}

impl ConfigFile {
    /// Build without validation; use `ConfigFile::try_from(raw)` instead.
    pub(crate) fn new_unchecked(raw: RawConfigFile, drain_grace: Duration) -> Self {
        Self {
            runner: raw.runner,
            detect: raw.detect,
            environment: raw.environment,
            drain_grace,
        }
    }

    pub fn drain_grace(&self) -> Duration {
        self.drain_grace
    }

    pub fn tools_directory(&self) -> PathBuf {
        self.runner
            .tools_directory
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("detect-runner"))
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default(), crate::exec::runner::DEFAULT_DRAIN_GRACE)
    }
}
