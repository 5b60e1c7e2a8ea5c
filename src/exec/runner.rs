// src/exec/runner.rs

//! The Detect process runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::command_line::{CommandLine, Identification};
use super::interpreter::{interpreter_path, Launcher};
use super::probe::run_interpreter_probe;
use crate::buildlog::JobLogger;
use crate::environment::{EnvironmentContext, WORKSPACE};
use crate::errors::DetectError;
use crate::fs::FileSystem;
use crate::strategy::{ExecutableDownloader, ExecutionStrategy, LaunchTarget};
use crate::types::{DetectResponse, OsFamily};

/// Default bound on waiting for the output tasks after the process exits.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(5);

/// Default amount of stderr kept in memory; older bytes are dropped.
pub const DEFAULT_STDERR_LIMIT: usize = 4 * 1024 * 1024;

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub java_home: Option<PathBuf>,
    pub os: OsFamily,
    pub identification: Identification,
    /// How long to wait for stdout/stderr to reach EOF once the process has
    /// exited. Tasks still running after that are aborted.
    pub drain_grace: Duration,
    /// Maximum stderr bytes held until the process exits. The tail is kept.
    pub stderr_limit: usize,
}

impl RunnerOptions {
    pub fn new(identification: Identification) -> Self {
        Self {
            java_home: None,
            os: OsFamily::current(),
            identification,
            drain_grace: DEFAULT_DRAIN_GRACE,
            stderr_limit: DEFAULT_STDERR_LIMIT,
        }
    }

    pub fn with_java_home(mut self, java_home: Option<PathBuf>) -> Self {
        self.java_home = java_home;
        self
    }

    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    pub fn with_stderr_limit(mut self, limit: usize) -> Self {
        self.stderr_limit = limit;
        self
    }
}

/// Runs Detect as a child process on the current host.
///
/// stdout is streamed into the build log while the process runs; stderr is
/// collected in memory and written after the process has exited, so the two
/// never interleave.
///
/// On Unix the child gets its own process group. A terminal Ctrl-C then
/// reaches only this process, which turns it into an interruption.
#[derive(Debug, Clone)]
pub struct RemoteProcessRunner {
    logger: JobLogger,
    options: RunnerOptions,
    fs: Arc<dyn FileSystem>,
}

impl RemoteProcessRunner {
    pub fn new(logger: JobLogger, options: RunnerOptions, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            logger,
            options,
            fs,
        }
    }

    /// Path of the Java interpreter this runner launches jars with.
    pub fn java(&self) -> PathBuf {
        interpreter_path(self.options.java_home.as_deref(), self.options.os)
    }

    /// Command line that [`run`](Self::run) would spawn for `target`.
    pub fn command_line(&self, target: &LaunchTarget, properties: &[String]) -> CommandLine {
        let launcher = Launcher::for_target(target, self.options.java_home.as_deref(), self.options.os);
        CommandLine::assemble(
            &launcher,
            properties,
            self.logger.level(),
            &self.options.identification,
        )
    }

    /// Run Detect once from an already prepared target.
    ///
    /// Sending on the `cancel` channel interrupts the run: the child is
    /// killed and the result is `Exceptional`. Dropping the sender does not
    /// interrupt. This never returns an error; every failure is folded into
    /// [`DetectResponse::Exceptional`].
    pub async fn run(
        &self,
        target: &LaunchTarget,
        properties: &[String],
        env: &EnvironmentContext,
        mut cancel: oneshot::Receiver<()>,
    ) -> DetectResponse {
        respond(self.run_target(target, properties, env, &mut cancel).await)
    }

    /// Like [`run`](Self::run), but prepares `strategy` first (possibly
    /// fetching the jar through `downloader`) after the run has been
    /// announced in the build log.
    pub async fn run_strategy(
        &self,
        strategy: &ExecutionStrategy,
        downloader: &dyn ExecutableDownloader,
        properties: &[String],
        env: &EnvironmentContext,
        mut cancel: oneshot::Receiver<()>,
    ) -> DetectResponse {
        respond(
            self.prepare_and_run(strategy, downloader, properties, env, &mut cancel)
                .await,
        )
    }

    async fn run_target(
        &self,
        target: &LaunchTarget,
        properties: &[String],
        env: &EnvironmentContext,
        cancel: &mut oneshot::Receiver<()>,
    ) -> Result<i32> {
        let workspace = self.workspace(env)?;
        self.announce(matches!(target, LaunchTarget::Jar(_)), None);
        run_interpreter_probe(&self.java(), env, &self.logger).await;
        self.launch(target, &workspace, properties, env, cancel).await
    }

    async fn prepare_and_run(
        &self,
        strategy: &ExecutionStrategy,
        downloader: &dyn ExecutableDownloader,
        properties: &[String],
        env: &EnvironmentContext,
        cancel: &mut oneshot::Receiver<()>,
    ) -> Result<i32> {
        let workspace = self.workspace(env)?;
        let download_url = match strategy {
            ExecutionStrategy::Download { url, .. } => Some(url.as_str()),
            _ => None,
        };
        self.announce(
            !matches!(strategy, ExecutionStrategy::Script { .. }),
            download_url,
        );
        run_interpreter_probe(&self.java(), env, &self.logger).await;

        let target = strategy
            .prepare(self.fs.as_ref(), downloader)
            .inspect_err(|e| debug!(strategy = strategy.name(), error = %e, "could not prepare Detect"))?;
        self.launch(&target, &workspace, properties, env, cancel).await
    }

    fn announce(&self, uses_java: bool, download_url: Option<&str>) {
        if uses_java {
            self.logger
                .info(format!("Running with JAVA: {}", self.java().display()));
        }
        if let Some(url) = download_url {
            self.logger.info(format!("Detect configured: {url}"));
        }
    }

    async fn launch(
        &self,
        target: &LaunchTarget,
        workspace: &Path,
        properties: &[String],
        env: &EnvironmentContext,
        cancel: &mut oneshot::Receiver<()>,
    ) -> Result<i32> {
        let launcher = Launcher::for_target(target, self.options.java_home.as_deref(), self.options.os);
        let command_line = CommandLine::assemble(
            &launcher,
            properties,
            self.logger.level(),
            &self.options.identification,
        );

        self.logger.info(format!("Running Detect: {}", file_name(target.path())));
        self.logger
            .info(format!("Running Detect command: {}", command_line.display()));

        let mut cmd = Command::new(command_line.program());
        cmd.args(command_line.arguments())
            .current_dir(workspace)
            .envs(env.variables())
            .envs(launcher.extra_env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning Detect process '{}'", command_line.program()))?;

        info!(
            pid = child.id(),
            program = %command_line.program(),
            workspace = %workspace.display(),
            "Detect process started"
        );

        let stdout_task = child
            .stdout
            .take()
            .map(|stdout| spawn_stdout_relay(stdout, self.logger.clone()));
        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| StderrBuffer::spawn(stderr, self.options.stderr_limit));

        let status = tokio::select! {
            status = child.wait() => {
                status.context("waiting for Detect process")?
            }
            Ok(()) = &mut *cancel => {
                interrupt(child, stdout_task, stderr_task).await;
                return Err(DetectError::Interrupted.into());
            }
        };

        let exit_code = status.code().unwrap_or(-1);
        info!(exit_code, success = status.success(), "Detect process exited");

        if let Some(handle) = stdout_task {
            join_with_grace(handle, self.options.drain_grace, "stdout").await;
        }
        if let Some(stderr) = stderr_task {
            let captured = stderr.finish(self.options.drain_grace).await;
            if captured.omitted > 0 {
                self.logger.warn(format!(
                    "Detect wrote more than {} bytes to stderr; the first {} bytes were dropped",
                    self.options.stderr_limit, captured.omitted
                ));
            }
            if !captured.bytes.is_empty() {
                self.logger.write_output(&captured.bytes);
            }
        }
        self.logger.flush();

        Ok(exit_code)
    }

    fn workspace(&self, env: &EnvironmentContext) -> Result<PathBuf> {
        let workspace = PathBuf::from(env.require(WORKSPACE)?);
        if !self.fs.is_dir(&workspace) {
            return Err(DetectError::ConfigError(format!(
                "{WORKSPACE} '{}' is not a directory",
                workspace.display()
            ))
            .into());
        }
        Ok(workspace)
    }
}

fn respond(result: Result<i32>) -> DetectResponse {
    match result {
        Ok(exit_code) => DetectResponse::from_exit_code(exit_code),
        Err(err) => {
            debug!(error = ?err, "Detect run ended exceptionally");
            DetectResponse::exceptional(err)
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Copy stdout into the build log chunk by chunk as it arrives.
fn spawn_stdout_relay(mut stdout: ChildStdout, logger: JobLogger) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            match stdout.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => logger.write_output(&buf[..n]),
                Err(e) => {
                    warn!(error = %e, "reading Detect stdout failed");
                    break;
                }
            }
        }
        debug!("stdout relay ended");
    })
}

/// Bounded tail of a byte stream.
#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    omitted: u64,
}

#[derive(Debug)]
struct TailBuffer {
    bytes: VecDeque<u8>,
    omitted: u64,
    limit: usize,
}

impl TailBuffer {
    fn new(limit: usize) -> Self {
        Self {
            bytes: VecDeque::new(),
            omitted: 0,
            limit,
        }
    }

    fn push(&mut self, data: &[u8]) {
        self.bytes.extend(data);
        let excess = self.bytes.len().saturating_sub(self.limit);
        if excess > 0 {
            self.bytes.drain(..excess);
            self.omitted += excess as u64;
        }
    }

    fn take(&mut self) -> Captured {
        Captured {
            bytes: std::mem::take(&mut self.bytes).into(),
            omitted: std::mem::take(&mut self.omitted),
        }
    }
}

/// stderr collected in memory while the process runs.
struct StderrBuffer {
    buf: Arc<Mutex<TailBuffer>>,
    handle: JoinHandle<()>,
}

impl StderrBuffer {
    fn spawn(mut stderr: ChildStderr, limit: usize) -> Self {
        let buf = Arc::new(Mutex::new(TailBuffer::new(limit)));
        let sink = Arc::clone(&buf);
        let handle = tokio::spawn(async move {
            let mut chunk = vec![0u8; READ_CHUNK];
            loop {
                match stderr.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => match sink.lock() {
                        Ok(mut b) => b.push(&chunk[..n]),
                        Err(_) => break,
                    },
                    Err(e) => {
                        warn!(error = %e, "reading Detect stderr failed");
                        break;
                    }
                }
            }
        });
        Self { buf, handle }
    }

    /// Wait (bounded) for EOF and hand back everything collected.
    async fn finish(self, grace: Duration) -> Captured {
        join_with_grace(self.handle, grace, "stderr").await;
        match self.buf.lock() {
            Ok(mut b) => b.take(),
            Err(_) => Captured::default(),
        }
    }

    fn abort(&self) {
        self.handle.abort();
    }
}

async fn join_with_grace(mut handle: JoinHandle<()>, grace: Duration, stream: &'static str) {
    match tokio::time::timeout(grace, &mut handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(stream, error = %e, "output task failed"),
        Err(_) => {
            debug!(stream, ?grace, "output still open after process exit; detaching");
            handle.abort();
        }
    }
}

/// Cleanup for an interrupted run: stop relaying output, then kill the child.
async fn interrupt(mut child: Child, stdout_task: Option<JoinHandle<()>>, stderr_task: Option<StderrBuffer>) {
    warn!(pid = child.id(), "Detect run interrupted; terminating process");

    if let Some(handle) = stdout_task {
        handle.abort();
    }
    if let Some(stderr) = stderr_task {
        stderr.abort();
    }
    if let Err(e) = child.kill().await {
        warn!(error = %e, "failed to kill Detect process after interruption");
    }
}
