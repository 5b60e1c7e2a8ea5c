// src/config/validate.rs

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DetectError, Result};

/// `--key` or `--key=value`.
static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^--[^\s=]+(=.*)?$").unwrap_or_else(|e| panic!("invalid property regex: {e}"))
});

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DetectError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        let grace = parse_duration(&raw.runner.drain_grace).map_err(|e| {
            DetectError::ConfigError(format!("[runner].drain_grace: {e}"))
        })?;
        Ok(ConfigFile::new_unchecked(raw, grace))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_runner(cfg)?;
    validate_detect(cfg)?;
    validate_environment(cfg)?;
    Ok(())
}

fn validate_runner(cfg: &RawConfigFile) -> Result<()> {
    let url = cfg.runner.download_url.trim();
    if !["http://", "https://", "file://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
    {
        return Err(DetectError::ConfigError(format!(
            "[runner].download_url must be an http(s):// or file:// URL (got '{url}')"
        )));
    }

    if let Err(e) = parse_duration(&cfg.runner.drain_grace) {
        return Err(DetectError::ConfigError(format!("[runner].drain_grace: {e}")));
    }

    Ok(())
}

fn validate_detect(cfg: &RawConfigFile) -> Result<()> {
    if cfg.detect.jar.is_some() && cfg.detect.script.is_some() {
        return Err(DetectError::ConfigError(
            "[detect].jar and [detect].script are mutually exclusive".to_string(),
        ));
    }
    validate_properties(&cfg.detect.properties)
}

/// Every property must look like `--key` or `--key=value`.
pub fn validate_properties(properties: &[String]) -> Result<()> {
    for property in properties {
        if !PROPERTY_RE.is_match(property) {
            return Err(DetectError::ConfigError(format!(
                "invalid Detect property '{property}' (expected --key=value)"
            )));
        }
    }
    Ok(())
}

fn validate_environment(cfg: &RawConfigFile) -> Result<()> {
    for key in cfg.environment.keys() {
        validate_env_key(key)?;
    }
    Ok(())
}

pub fn validate_env_key(key: &str) -> Result<()> {
    if key.trim().is_empty() || key.contains('=') {
        return Err(DetectError::ConfigError(format!(
            "invalid environment variable name '{key}'"
        )));
    }
    Ok(())
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };
    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
