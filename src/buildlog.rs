// src/buildlog.rs

//! The build log: where Detect's output and the runner's user-facing
//! messages end up.
//!
//! This is separate from the `tracing` diagnostics set up in
//! [`crate::logging`]. The build log is what the pipeline user reads; it
//! receives leveled lines (`[INFO] ...`) and raw process bytes.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::types::LogLevel;

/// Append-only destination for build-log bytes.
///
/// Implementations must tolerate writes from more than one task, although
/// the runner never writes from two tasks at the same time.
pub trait OutputSink: Send + Sync {
    fn write_bytes(&self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes to the process stdout.
#[derive(Debug, Clone, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(bytes)?;
        out.flush()
    }
}

/// Collects everything into a shared buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.buf.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Buffer contents decoded lossily as UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }
}

impl OutputSink for MemorySink {
    fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        let mut buf = self
            .buf
            .lock()
            .map_err(|_| io::Error::other("memory sink poisoned"))?;
        buf.extend_from_slice(bytes);
        Ok(())
    }
}

/// Leveled logger writing into an [`OutputSink`].
#[derive(Clone)]
pub struct JobLogger {
    level: LogLevel,
    sink: Arc<dyn OutputSink>,
}

impl fmt::Debug for JobLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobLogger")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}

impl JobLogger {
    pub fn new(level: LogLevel, sink: Arc<dyn OutputSink>) -> Self {
        Self { level, sink }
    }

    pub fn stdout(level: LogLevel) -> Self {
        Self::new(level, Arc::new(StdoutSink))
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message.as_ref());
    }

    /// Log an error message followed by every cause in the chain.
    pub fn error_chain(&self, message: impl AsRef<str>, causes: &[String]) {
        self.log(LogLevel::Error, message.as_ref());
        for cause in causes {
            self.log(LogLevel::Error, &format!("  caused by: {cause}"));
        }
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message.as_ref());
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.level.permits(level) {
            return;
        }
        let line = format!("[{level}] {message}\n");
        self.write_output(line.as_bytes());
    }

    /// Raw passthrough of process output.
    pub fn write_output(&self, bytes: &[u8]) {
        if let Err(e) = self.sink.write_bytes(bytes) {
            warn!(error = %e, "failed to write to build log");
        }
    }

    pub fn flush(&self) {
        if let Err(e) = self.sink.flush() {
            warn!(error = %e, "failed to flush build log");
        }
    }
}
