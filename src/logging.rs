// src/logging.rs

//! Diagnostics for `detect-runner` itself, using `tracing` +
//! `tracing-subscriber`.
//!
//! This is not the build log (see [`crate::buildlog`]). Priority for the
//! filter:
//! 1. `DETECT_RUNNER_LOG` environment variable (`EnvFilter` syntax, e.g.
//!    "debug" or "detect_runner::exec=trace")
//! 2. default to `warn`
//!
//! Logs are sent to STDERR so that stdout carries only the build log.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "DETECT_RUNNER_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}
