// src/exec/probe.rs

//! Debug-only interpreter probe.
//!
//! At DEBUG level the runner prints `PATH` and the output of
//! `<java> -version` before the real run. Whatever happens here is only
//! ever logged; it has no way to influence the run's `DetectResponse`.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::debug;

use crate::buildlog::JobLogger;
use crate::environment::{EnvironmentContext, PATH};
use crate::types::LogLevel;

/// Run the probe if the logger is at DEBUG (or finer). Never fails.
pub async fn run_interpreter_probe(java: &Path, env: &EnvironmentContext, logger: &JobLogger) {
    logger.debug(format!("PATH: {}", env.get(PATH).unwrap_or_default()));

    if logger.level() < LogLevel::Debug {
        return;
    }

    if let Err(err) = probe(java, env, logger).await {
        debug!(java = %java.display(), error = ?err, "interpreter probe failed");
        logger.debug(format!("Error printing the JAVA version: {err:#}"));
    }
}

async fn probe(java: &Path, env: &EnvironmentContext, logger: &JobLogger) -> Result<()> {
    logger.info("Java version: ");

    let output = Command::new(java)
        .arg("-version")
        .envs(env.variables())
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("running {} -version", java.display()))?;

    // `java -version` reports on stderr.
    logger.write_output(&output.stderr);
    logger.write_output(&output.stdout);

    debug!(
        java = %java.display(),
        exit_code = output.status.code().unwrap_or(-1),
        "interpreter probe finished"
    );
    Ok(())
}
