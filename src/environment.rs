// src/environment.rs

//! Environment variable snapshot handed to the runner.
//!
//! An `EnvironmentContext` is built once per run (usually from the host
//! environment plus configured overrides) and is then only read. It is used
//! both to pick an execution strategy and as the child process environment.

use std::collections::BTreeMap;

use crate::errors::{DetectError, Result};
use crate::types::OsFamily;

/// Working directory of the build. Required.
pub const WORKSPACE: &str = "WORKSPACE";
/// Interpreter home, used when no explicit java home is configured.
pub const JAVA_HOME: &str = "JAVA_HOME";
/// User-provided Detect jar.
pub const DETECT_JAR: &str = "DETECT_JAR";
/// Truthy value selects the air-gapped script strategy.
pub const DETECT_AIR_GAP: &str = "DETECT_AIR_GAP";
/// Script used in air-gapped mode.
pub const DETECT_SCRIPT: &str = "DETECT_SCRIPT";
/// Overrides the configured download URL.
pub const DETECT_DOWNLOAD_URL: &str = "DETECT_DOWNLOAD_URL";
/// Install directory the Detect script downloads into.
pub const DETECT_JAR_DOWNLOAD_DIR: &str = "DETECT_JAR_DOWNLOAD_DIR";
/// Version of the host engine, forwarded to Detect for identification.
pub const JENKINS_VERSION: &str = "JENKINS_VERSION";
pub const PATH: &str = "PATH";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentContext {
    vars: BTreeMap<String, String>,
    case_insensitive: bool,
}

impl EnvironmentContext {
    /// Empty, case-sensitive context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty context whose lookups ignore case (Windows semantics).
    pub fn case_insensitive() -> Self {
        Self {
            vars: BTreeMap::new(),
            case_insensitive: true,
        }
    }

    /// Snapshot of the current process environment.
    pub fn from_host() -> Self {
        let mut ctx = if OsFamily::current().is_windows() {
            Self::case_insensitive()
        } else {
            Self::new()
        };
        // Non-UTF-8 variables are left out of the snapshot.
        ctx.put_all(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        );
        ctx
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut ctx = Self::new();
        ctx.put_all(pairs);
        ctx
    }

    /// Insert or replace a variable. In case-insensitive mode an existing
    /// key that differs only by case is replaced.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if self.case_insensitive {
            if let Some(existing) = self.find_key(&key).map(str::to_string) {
                self.vars.remove(&existing);
            }
        }
        self.vars.insert(key, value.into());
    }

    pub fn put_all<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in pairs {
            self.put(k, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.find_key(key)
            .and_then(|k| self.vars.get(k))
            .map(String::as_str)
    }

    /// Like [`get`](Self::get) but treats blank values as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// Look up a variable that must be present and non-empty.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get_non_empty(key)
            .ok_or_else(|| DetectError::MissingEnvironment(key.to_string()))
    }

    /// `true`, `1`, `yes` or `on` (any case).
    pub fn is_truthy(&self, key: &str) -> bool {
        matches!(
            self.get(key).map(|v| v.trim().to_lowercase()).as_deref(),
            Some("true" | "1" | "yes" | "on")
        )
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    fn find_key(&self, key: &str) -> Option<&str> {
        if self.case_insensitive {
            self.vars
                .keys()
                .find(|k| k.eq_ignore_ascii_case(key))
                .map(String::as_str)
        } else {
            self.vars.get_key_value(key).map(|(k, _)| k.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_sensitive_lookup_by_default() {
        let env = EnvironmentContext::from_pairs([("Path", "/usr/bin")]);
        assert_eq!(env.get("Path"), Some("/usr/bin"));
        assert_eq!(env.get("PATH"), None);
    }

    #[test]
    fn case_insensitive_lookup_and_replace() {
        let mut env = EnvironmentContext::case_insensitive();
        env.put("Path", "/usr/bin");
        assert_eq!(env.get("PATH"), Some("/usr/bin"));

        env.put("PATH", "/opt/bin");
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("path"), Some("/opt/bin"));
    }

    #[test]
    fn require_rejects_missing_and_blank() {
        let env = EnvironmentContext::from_pairs([(WORKSPACE, "  ")]);
        match env.require(WORKSPACE) {
            Err(DetectError::MissingEnvironment(name)) => assert_eq!(name, WORKSPACE),
            other => panic!("expected MissingEnvironment, got {other:?}"),
        }
        assert!(env.require(DETECT_JAR).is_err());
    }

    #[test]
    fn truthy_values() {
        let env = EnvironmentContext::from_pairs([
            ("A", "TRUE"),
            ("B", " yes "),
            ("C", "0"),
            ("D", ""),
        ]);
        assert!(env.is_truthy("A"));
        assert!(env.is_truthy("B"));
        assert!(!env.is_truthy("C"));
        assert!(!env.is_truthy("D"));
        assert!(!env.is_truthy("MISSING"));
    }
}
