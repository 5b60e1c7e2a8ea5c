// src/lib.rs

pub mod buildlog;
pub mod cli;
pub mod config;
pub mod environment;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;
pub mod strategy;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::buildlog::JobLogger;
use crate::cli::CliArgs;
use crate::config::validate::{validate_env_key, validate_properties};
use crate::config::{load_or_default, ConfigFile};
use crate::environment::{EnvironmentContext, JAVA_HOME, JENKINS_VERSION, WORKSPACE};
use crate::errors::{DetectError, Result};
use crate::exec::{Identification, RemoteProcessRunner, RunnerOptions};
use crate::fs::{FileSystem, RealFileSystem};
use crate::report::ResultReporter;
use crate::strategy::{CacheOnlyDownloader, ExecutableDownloader, ExecutionStrategy, StrategyResolver};
use crate::types::{DetectResponse, LogLevel, OsFamily};

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the environment snapshot
/// - strategy resolution / preparation
/// - the process runner (with Ctrl-C as interruption)
/// - result reporting
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(args.config.as_deref())?;
    let settings = RunSettings::from_sources(&cfg, &args)?;

    let env = settings.environment(EnvironmentContext::from_host());
    // Fail before downloading or spawning anything.
    env.require(WORKSPACE)?;

    let logger = JobLogger::stdout(settings.log_level);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let downloader = Arc::new(CacheOnlyDownloader::new(Arc::clone(&fs)));
    let step = DetectStep::new(settings, env, logger.clone(), fs, downloader);

    if args.dry_run {
        print_dry_run(&step);
        return Ok(report::codes::SUCCESS);
    }

    // Ctrl-C → interrupt the run.
    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            return;
        }
        let _ = cancel_tx.send(());
    });

    let response = step.execute(cancel_rx).await;

    if let Some(path) = &args.result_json {
        if let Err(e) = write_result_json(path, &response) {
            warn!(path = %path.display(), error = %e, "failed to write result file");
            logger.warn(format!("Could not write {}: {e}", path.display()));
        }
    }

    let outcome = ResultReporter::new(logger).report(&response);
    info!(exit_code = outcome.exit_code, kind = ?outcome.kind, "Detect step finished");
    Ok(outcome.exit_code)
}

/// Effective settings after merging the config file and CLI flags.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub java_home: Option<PathBuf>,
    pub tools_directory: PathBuf,
    pub download_url: String,
    pub log_level: LogLevel,
    pub drain_grace: Duration,
    pub host_version: Option<String>,
    pub jar: Option<PathBuf>,
    pub script: Option<PathBuf>,
    pub properties: Vec<String>,
    pub env_overrides: Vec<(String, String)>,
}

impl RunSettings {
    /// CLI flags win over the file; CLI properties are appended to the
    /// configured ones and CLI `--env` entries override `[environment]`.
    pub fn from_sources(cfg: &ConfigFile, args: &CliArgs) -> Result<Self> {
        validate_properties(&args.properties)?;
        for (key, _) in &args.env {
            validate_env_key(key)?;
        }

        let (jar, script) = match (&args.jar, &args.script) {
            (None, None) => (cfg.detect.jar.clone(), cfg.detect.script.clone()),
            (jar, script) => (jar.clone(), script.clone()),
        };

        let mut properties = cfg.detect.properties.clone();
        properties.extend(args.properties.iter().cloned());

        let mut env_overrides: Vec<(String, String)> = cfg
            .environment
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        env_overrides.extend(args.env.iter().cloned());

        Ok(Self {
            java_home: args.java_home.clone().or_else(|| cfg.runner.java_home.clone()),
            tools_directory: args.tools_dir.clone().unwrap_or_else(|| cfg.tools_directory()),
            download_url: args
                .download_url
                .clone()
                .unwrap_or_else(|| cfg.runner.download_url.clone()),
            log_level: args.log_level.unwrap_or(cfg.runner.log_level),
            drain_grace: cfg.drain_grace(),
            host_version: args.host_version.clone().or_else(|| cfg.runner.host_version.clone()),
            jar,
            script,
            properties,
            env_overrides,
        })
    }

    /// Overlay the configured variables onto `base`.
    pub fn environment(&self, mut base: EnvironmentContext) -> EnvironmentContext {
        base.put_all(self.env_overrides.iter().cloned());
        base
    }

    /// Explicit java home, else `JAVA_HOME` from the run environment.
    pub fn effective_java_home(&self, env: &EnvironmentContext) -> Option<PathBuf> {
        self.java_home
            .clone()
            .or_else(|| env.get_non_empty(JAVA_HOME).map(PathBuf::from))
    }

    pub fn identification(&self, env: &EnvironmentContext) -> Identification {
        let host = self
            .host_version
            .clone()
            .or_else(|| env.get_non_empty(JENKINS_VERSION).map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        Identification::new(host)
    }
}

/// One execution of the Detect build step.
pub struct DetectStep {
    settings: RunSettings,
    env: EnvironmentContext,
    logger: JobLogger,
    fs: Arc<dyn FileSystem>,
    downloader: Arc<dyn ExecutableDownloader>,
    os: OsFamily,
}

impl DetectStep {
    pub fn new(
        settings: RunSettings,
        env: EnvironmentContext,
        logger: JobLogger,
        fs: Arc<dyn FileSystem>,
        downloader: Arc<dyn ExecutableDownloader>,
    ) -> Self {
        Self {
            settings,
            env,
            logger,
            fs,
            downloader,
            os: OsFamily::current(),
        }
    }

    pub fn environment(&self) -> &EnvironmentContext {
        &self.env
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        let resolver = StrategyResolver::new(
            self.settings.download_url.clone(),
            self.settings.tools_directory.clone(),
            self.os,
        );
        resolver.resolve(
            &self.env,
            self.settings.jar.as_deref(),
            self.settings.script.as_deref(),
        )
    }

    pub fn runner(&self) -> RemoteProcessRunner {
        let options = RunnerOptions::new(self.settings.identification(&self.env))
            .with_java_home(self.settings.effective_java_home(&self.env))
            .with_drain_grace(self.settings.drain_grace);
        RemoteProcessRunner::new(self.logger.clone(), options, Arc::clone(&self.fs))
    }

    /// Resolve, prepare and run. Preparation failures are folded into
    /// [`DetectResponse::Exceptional`] like run failures.
    pub async fn execute(&self, cancel: oneshot::Receiver<()>) -> DetectResponse {
        self.runner()
            .run_strategy(
                &self.strategy(),
                self.downloader.as_ref(),
                &self.settings.properties,
                &self.env,
                cancel,
            )
            .await
    }
}

/// Resolved strategy and visible command line, without spawning.
fn print_dry_run(step: &DetectStep) {
    let strategy = step.strategy();
    println!("detect-runner dry-run");
    println!("  strategy: {}", strategy.name());
    match &strategy {
        ExecutionStrategy::Jar { path } => println!("  jar: {}", path.display()),
        ExecutionStrategy::Script { path, install_dir } => {
            println!("  script: {}", path.display());
            if let Some(dir) = install_dir {
                println!("  install_dir: {}", dir.display());
            }
        }
        ExecutionStrategy::Download { url, cache_dir } => {
            println!("  url: {url}");
            println!("  cache_dir: {}", cache_dir.display());
        }
    }

    match strategy.prepare(step.fs.as_ref(), step.downloader.as_ref()) {
        Ok(target) => {
            let runner = step.runner();
            let cmd = runner.command_line(&target, &step.settings.properties);
            println!("  command: {}", cmd.display());
        }
        Err(e) => println!("  command: unavailable ({e})"),
    }

    debug!("dry-run complete (no execution)");
}

fn write_result_json(path: &std::path::Path, response: &DetectResponse) -> Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| DetectError::Other(anyhow::Error::from(e)))?;
    std::fs::write(path, json)?;
    Ok(())
}
