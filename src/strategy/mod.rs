// src/strategy/mod.rs

//! Choosing how Detect gets launched.
//!
//! - [`StrategyResolver`] picks exactly one [`ExecutionStrategy`] from the
//!   environment and caller inputs. It is a pure function and never fails.
//! - [`ExecutionStrategy::prepare`] turns the choice into a [`LaunchTarget`],
//!   checking that files exist or asking an [`ExecutableDownloader`] for the
//!   jar.

pub mod download;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::environment::{
    EnvironmentContext, DETECT_AIR_GAP, DETECT_DOWNLOAD_URL, DETECT_JAR, DETECT_JAR_DOWNLOAD_DIR,
    DETECT_SCRIPT,
};
use crate::errors::{DetectError, Result};
use crate::fs::FileSystem;
use crate::types::OsFamily;

pub use download::{CacheOnlyDownloader, ExecutableDownloader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// A jar supplied by the user.
    Jar { path: PathBuf },
    /// Air-gapped: run the Detect script, optionally pointing it at an
    /// install directory.
    Script {
        path: PathBuf,
        install_dir: Option<PathBuf>,
    },
    /// Obtain the jar from `url`, caching it under `cache_dir`.
    Download { url: String, cache_dir: PathBuf },
}

/// Something the runner can launch directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    Jar(PathBuf),
    Script {
        path: PathBuf,
        install_dir: Option<PathBuf>,
    },
}

impl LaunchTarget {
    pub fn path(&self) -> &Path {
        match self {
            LaunchTarget::Jar(path) | LaunchTarget::Script { path, .. } => path,
        }
    }
}

impl ExecutionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionStrategy::Jar { .. } => "jar",
            ExecutionStrategy::Script { .. } => "script",
            ExecutionStrategy::Download { .. } => "download",
        }
    }

    /// Resolve the strategy into a launchable target.
    pub fn prepare(
        &self,
        fs: &dyn FileSystem,
        downloader: &dyn ExecutableDownloader,
    ) -> Result<LaunchTarget> {
        match self {
            ExecutionStrategy::Jar { path } => {
                let jar = existing_file(fs, path)?;
                Ok(LaunchTarget::Jar(jar))
            }
            ExecutionStrategy::Script { path, install_dir } => {
                let script = existing_file(fs, path)?;
                Ok(LaunchTarget::Script {
                    path: script,
                    install_dir: install_dir.clone(),
                })
            }
            ExecutionStrategy::Download { url, cache_dir } => {
                let jar = downloader.download(url, cache_dir)?;
                let jar = existing_file(fs, &jar)?;
                Ok(LaunchTarget::Jar(jar))
            }
        }
    }
}

fn existing_file(fs: &dyn FileSystem, path: &Path) -> Result<PathBuf> {
    if !fs.is_file(path) {
        return Err(DetectError::ExecutableNotFound(path.to_path_buf()));
    }
    Ok(fs.canonicalize(path)?)
}

/// Picks the execution strategy for a run.
#[derive(Debug, Clone)]
pub struct StrategyResolver {
    download_url: String,
    tools_directory: PathBuf,
    os: OsFamily,
}

impl StrategyResolver {
    pub fn new(download_url: impl Into<String>, tools_directory: impl Into<PathBuf>, os: OsFamily) -> Self {
        Self {
            download_url: download_url.into(),
            tools_directory: tools_directory.into(),
            os,
        }
    }

    /// First match wins:
    ///
    /// 1. `DETECT_JAR` (or a caller jar) → [`ExecutionStrategy::Jar`]
    /// 2. a caller script, `DETECT_SCRIPT`, or truthy `DETECT_AIR_GAP`
    ///    → [`ExecutionStrategy::Script`]
    /// 3. otherwise → [`ExecutionStrategy::Download`]
    pub fn resolve(
        &self,
        env: &EnvironmentContext,
        caller_jar: Option<&Path>,
        caller_script: Option<&Path>,
    ) -> ExecutionStrategy {
        let strategy = self.pick(env, non_empty(caller_jar), non_empty(caller_script));
        debug!(strategy = strategy.name(), ?strategy, "resolved execution strategy");
        strategy
    }

    fn pick(
        &self,
        env: &EnvironmentContext,
        caller_jar: Option<&Path>,
        caller_script: Option<&Path>,
    ) -> ExecutionStrategy {
        if let Some(jar) = env.get_non_empty(DETECT_JAR) {
            return ExecutionStrategy::Jar {
                path: PathBuf::from(jar),
            };
        }
        if let Some(jar) = caller_jar {
            return ExecutionStrategy::Jar {
                path: jar.to_path_buf(),
            };
        }

        let env_script = env.get_non_empty(DETECT_SCRIPT).map(Path::new);
        if caller_script.is_some() || env_script.is_some() || env.is_truthy(DETECT_AIR_GAP) {
            let path = caller_script
                .or(env_script)
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.default_script_path());
            return ExecutionStrategy::Script {
                path,
                install_dir: env.get_non_empty(DETECT_JAR_DOWNLOAD_DIR).map(PathBuf::from),
            };
        }

        let url = env
            .get_non_empty(DETECT_DOWNLOAD_URL)
            .unwrap_or(self.download_url.as_str())
            .to_string();
        ExecutionStrategy::Download {
            url,
            cache_dir: self.tools_directory.join("detect"),
        }
    }

    fn default_script_path(&self) -> PathBuf {
        let name = if self.os.is_windows() { "detect.ps1" } else { "detect.sh" };
        self.tools_directory.join(name)
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}
