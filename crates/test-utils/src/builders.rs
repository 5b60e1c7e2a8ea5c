#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use detect_runner::buildlog::{JobLogger, MemorySink};
use detect_runner::config::{ConfigFile, RawConfigFile};
use detect_runner::environment::{EnvironmentContext, WORKSPACE};
use detect_runner::exec::{Identification, RemoteProcessRunner, RunnerOptions};
use detect_runner::fs::RealFileSystem;
use detect_runner::types::LogLevel;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn java_home(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.runner.java_home = Some(path.into());
        self
    }

    pub fn tools_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.runner.tools_directory = Some(path.into());
        self
    }

    pub fn download_url(mut self, url: &str) -> Self {
        self.config.runner.download_url = url.to_string();
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.runner.log_level = level;
        self
    }

    pub fn drain_grace(mut self, grace: &str) -> Self {
        self.config.runner.drain_grace = grace.to_string();
        self
    }

    pub fn jar(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.detect.jar = Some(path.into());
        self
    }

    pub fn property(mut self, property: &str) -> Self {
        self.config.detect.properties.push(property.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.config
            .environment
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment containing only `WORKSPACE`.
pub fn workspace_env(workspace: &Path) -> EnvironmentContext {
    EnvironmentContext::from_pairs([(WORKSPACE, workspace.display().to_string())])
}

/// Identification every test runner reports.
pub fn test_identification() -> Identification {
    Identification {
        host_version: "2.440.1".to_string(),
        plugin_version: "0.1.0".to_string(),
    }
}

/// Runner writing into a fresh `MemorySink`, using the real filesystem.
pub fn memory_runner(
    level: LogLevel,
    java_home: Option<PathBuf>,
    grace: Duration,
) -> (RemoteProcessRunner, MemorySink) {
    let options = RunnerOptions::new(test_identification())
        .with_java_home(java_home)
        .with_drain_grace(grace);
    memory_runner_with(level, options)
}

/// Like [`memory_runner`] with fully custom options.
pub fn memory_runner_with(level: LogLevel, options: RunnerOptions) -> (RemoteProcessRunner, MemorySink) {
    let sink = MemorySink::new();
    let logger = JobLogger::new(level, Arc::new(sink.clone()));
    (
        RemoteProcessRunner::new(logger, options, Arc::new(RealFileSystem)),
        sink,
    )
}
