// src/exec/command_line.rs

//! Assembly of the Detect command line.
//!
//! Layout:
//!
//! ```text
//! <program> <flags...> <target> [properties...] [--logging.level.<ns>=<LEVEL>] <identification...>
//! ```
//!
//! The identification arguments always go last and are left out of
//! [`CommandLine::display`], which is what gets written to the build log.

use super::interpreter::Launcher;
use crate::types::LogLevel;

/// Logging namespace Detect reads its own log level from.
pub const LOGGING_LEVEL_KEY: &str = "logging.level.com.blackducksoftware.integration";

const HOST_VERSION_KEY: &str = "detect.phone.home.passthrough.jenkins.version";
const PLUGIN_VERSION_KEY: &str = "detect.phone.home.passthrough.jenkins.plugin.version";

/// Versions Detect reports back for usage tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub host_version: String,
    pub plugin_version: String,
}

impl Identification {
    pub fn new(host_version: impl Into<String>) -> Self {
        Self {
            host_version: host_version.into(),
            plugin_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    fn arguments(&self) -> [String; 2] {
        [
            format!("--{HOST_VERSION_KEY}={}", self.host_version),
            format!("--{PLUGIN_VERSION_KEY}={}", self.plugin_version),
        ]
    }
}

/// True when any property already configures Detect's log level.
pub fn has_logging_level(properties: &[String]) -> bool {
    properties
        .iter()
        .any(|p| p.to_lowercase().contains(LOGGING_LEVEL_KEY))
}

pub fn logging_level_argument(level: LogLevel) -> String {
    format!("--{LOGGING_LEVEL_KEY}={level}")
}

/// Ordered arguments of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    args: Vec<String>,
    /// Number of trailing arguments hidden from [`display`](Self::display).
    hidden_tail: usize,
}

impl CommandLine {
    pub fn assemble(
        launcher: &Launcher,
        properties: &[String],
        level: LogLevel,
        identification: &Identification,
    ) -> Self {
        let mut args = Vec::with_capacity(properties.len() + launcher.flags.len() + 5);
        args.push(launcher.program.display().to_string());
        args.extend(launcher.flags.iter().cloned());
        args.push(launcher.target.display().to_string());
        args.extend(properties.iter().cloned());

        if !has_logging_level(properties) {
            args.push(logging_level_argument(level));
        }

        let hidden = identification.arguments();
        let hidden_tail = hidden.len();
        args.extend(hidden);

        Self { args, hidden_tail }
    }

    /// Program to spawn.
    pub fn program(&self) -> &str {
        &self.args[0]
    }

    /// Arguments after the program, including the hidden tail.
    pub fn arguments(&self) -> &[String] {
        &self.args[1..]
    }

    /// Program and arguments exactly as spawned.
    pub fn argv(&self) -> &[String] {
        &self.args
    }

    /// Arguments safe to show to the user.
    pub fn visible(&self) -> &[String] {
        &self.args[..self.args.len() - self.hidden_tail]
    }

    /// Space-joined visible command line.
    pub fn display(&self) -> String {
        self.visible().join(" ")
    }
}
