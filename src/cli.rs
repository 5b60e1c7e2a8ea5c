// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::Parser;

use crate::types::LogLevel;

/// Command-line arguments for `detect-runner`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "detect-runner",
    version,
    about = "Locate and run the Detect scanner, relaying its output into the build log.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `detect-runner.toml` in the current directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Java home; Detect is launched with `<PATH>/bin/java`.
    #[arg(long, value_name = "PATH")]
    pub java_home: Option<PathBuf>,

    /// Use this Detect jar instead of downloading one.
    #[arg(long, value_name = "PATH", conflicts_with = "script")]
    pub jar: Option<PathBuf>,

    /// Run this Detect script (air-gapped mode).
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Directory holding the cached jar and the default script.
    #[arg(long, value_name = "PATH")]
    pub tools_dir: Option<PathBuf>,

    /// Where the Detect jar is obtained from.
    #[arg(long, value_name = "URL")]
    pub download_url: Option<String>,

    /// Build-log level (error, warn, info, debug, trace); also passed to Detect.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Host engine version reported to Detect.
    #[arg(long, value_name = "VERSION")]
    pub host_version: Option<String>,

    /// Extra environment variable for the run (repeatable).
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,

    /// Write the run result as JSON to this file.
    #[arg(long, value_name = "PATH")]
    pub result_json: Option<PathBuf>,

    /// Resolve the strategy and print the command line, but don't run Detect.
    #[arg(long)]
    pub dry_run: bool,

    /// Detect properties, after `--` (e.g. `-- --detect.source.path=.`).
    #[arg(last = true, value_name = "DETECT_PROPERTY")]
    pub properties: Vec<String>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty variable name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
