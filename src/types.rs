use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Log level shared by the build log, the CLI and the injected
/// `--logging.level...` argument handed to Detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    /// Whether a message at `message_level` should be emitted when this is
    /// the configured level.
    pub fn permits(self, message_level: LogLevel) -> bool {
        message_level <= self
    }
}

/// Upper-case form, as understood by Detect's logging configuration.
impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!(
                "invalid log level: {other} (expected error, warn, info, debug or trace)"
            )),
        }
    }
}

/// Operating system family of the host the tool is launched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    Unix,
}

impl OsFamily {
    pub fn current() -> Self {
        if cfg!(windows) {
            OsFamily::Windows
        } else {
            OsFamily::Unix
        }
    }

    pub fn is_windows(self) -> bool {
        matches!(self, OsFamily::Windows)
    }
}

/// Serializable snapshot of an error and its cause chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default)]
    pub causes: Vec<String>,
}

impl ErrorDetail {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        Self {
            message: err.to_string(),
            causes: err.chain().skip(1).map(|c| c.to_string()).collect(),
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        for cause in &self.causes {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

/// Outcome of a single Detect run.
///
/// Produced once by the runner and consumed once by the reporter. The
/// serialized form is what crosses a controller/agent boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DetectResponse {
    /// The process exited with code 0.
    Success { exit_code: i32 },
    /// The process exited cleanly with a non-zero code.
    Failure { exit_code: i32 },
    /// The run could not be completed (spawn error, interruption, setup).
    Exceptional { error: ErrorDetail },
}

impl DetectResponse {
    pub fn from_exit_code(exit_code: i32) -> Self {
        if exit_code == 0 {
            DetectResponse::Success { exit_code }
        } else {
            DetectResponse::Failure { exit_code }
        }
    }

    pub fn exceptional(err: impl Into<anyhow::Error>) -> Self {
        DetectResponse::Exceptional {
            error: ErrorDetail::from_anyhow(&err.into()),
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            DetectResponse::Success { exit_code } | DetectResponse::Failure { exit_code } => {
                Some(*exit_code)
            }
            DetectResponse::Exceptional { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DetectResponse::Success { .. })
    }

    pub fn is_exceptional(&self) -> bool {
        matches!(self, DetectResponse::Exceptional { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn exit_code_zero_is_success_anything_else_failure() {
        assert_eq!(
            DetectResponse::from_exit_code(0),
            DetectResponse::Success { exit_code: 0 }
        );
        assert_eq!(
            DetectResponse::from_exit_code(3),
            DetectResponse::Failure { exit_code: 3 }
        );
        assert_eq!(
            DetectResponse::from_exit_code(-1),
            DetectResponse::Failure { exit_code: -1 }
        );
    }

    #[test]
    fn exceptional_keeps_cause_chain() {
        let err = Err::<(), _>(std::io::Error::other("permission denied"))
            .context("spawning Detect")
            .unwrap_err();

        let resp = DetectResponse::exceptional(err);
        match resp {
            DetectResponse::Exceptional { error } => {
                assert_eq!(error.message, "spawning Detect");
                assert_eq!(error.causes, vec!["permission denied".to_string()]);
                assert_eq!(error.to_string(), "spawning Detect: permission denied");
            }
            other => panic!("expected Exceptional, got {other:?}"),
        }
    }

    #[test]
    fn response_serializes_with_result_tag() {
        let json = serde_json::to_string(&DetectResponse::Failure { exit_code: 3 }).unwrap();
        assert_eq!(json, r#"{"result":"failure","exit_code":3}"#);

        let back: DetectResponse =
            serde_json::from_str(r#"{"result":"exceptional","error":{"message":"boom"}}"#).unwrap();
        assert!(back.is_exceptional());
    }

    #[test]
    fn log_level_display_and_ordering() {
        assert_eq!(LogLevel::Info.to_string(), "INFO");
        assert_eq!("Warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!(LogLevel::Debug.permits(LogLevel::Info));
        assert!(!LogLevel::Info.permits(LogLevel::Debug));
        assert!(LogLevel::Error.permits(LogLevel::Error));
    }
}
