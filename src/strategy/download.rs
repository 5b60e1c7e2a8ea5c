// src/strategy/download.rs

//! Obtaining the Detect jar for the download strategy.
//!
//! The transfer itself is the host's business; the runner only needs "give
//! me a local file for this URL". [`CacheOnlyDownloader`] serves that from a
//! cache directory that was populated beforehand.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{DetectError, Result};
use crate::fs::FileSystem;

pub trait ExecutableDownloader: Send + Sync {
    /// Return a local path to the Detect executable for `url`, using
    /// `target_dir` as the download / cache location.
    fn download(&self, url: &str, target_dir: &Path) -> Result<PathBuf>;
}

/// Resolves the jar from an already-populated cache directory.
///
/// If the URL names a `.jar` file, that exact file is required. Otherwise
/// the `*.jar` with the highest version in its file name is used.
#[derive(Debug, Clone)]
pub struct CacheOnlyDownloader {
    fs: Arc<dyn FileSystem>,
}

impl CacheOnlyDownloader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl ExecutableDownloader for CacheOnlyDownloader {
    fn download(&self, url: &str, target_dir: &Path) -> Result<PathBuf> {
        let fail = |reason: String| DetectError::Download {
            url: url.to_string(),
            reason,
        };

        if !self.fs.is_dir(target_dir) {
            return Err(fail(format!(
                "cache directory {} does not exist",
                target_dir.display()
            )));
        }

        if let Some(name) = jar_name_from_url(url) {
            let candidate = target_dir.join(name);
            debug!(url, candidate = %candidate.display(), "looking up cached jar by name");
            return if self.fs.is_file(&candidate) {
                Ok(candidate)
            } else {
                Err(fail(format!(
                    "{name} is not present in {}",
                    target_dir.display()
                )))
            };
        }

        let jars = self.fs.files_with_extension(target_dir, "jar")?;
        jars.into_iter()
            .max_by(|a, b| version_key(a).cmp(&version_key(b)).then_with(|| a.cmp(b)))
            .ok_or_else(|| fail(format!("no jar found in {}", target_dir.display())))
    }
}

/// Numeric components of a file name, so `detect-10.0.0.jar` sorts after
/// `detect-9.2.0.jar`. Names without digits sort first.
fn version_key(path: &Path) -> Vec<u64> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().unwrap_or(u64::MAX))
        .collect()
}

/// Last path segment of `url` if it names a jar.
fn jar_name_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.trim_end_matches('/').rsplit('/').next()?;
    (last.len() > 4 && last.to_ascii_lowercase().ends_with(".jar")).then_some(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn jar_name_is_taken_from_url() {
        assert_eq!(
            jar_name_from_url("https://repo.example.com/x/detect-9.0.0.jar?sig=1"),
            Some("detect-9.0.0.jar")
        );
        assert_eq!(jar_name_from_url("https://repo.example.com/latest/"), None);
        assert_eq!(jar_name_from_url("https://repo.example.com/.jar"), None);
    }

    #[test]
    fn picks_newest_jar_when_url_has_no_file_name() {
        let fs = MockFileSystem::new();
        fs.add_file("/cache/detect-8.9.0.jar");
        fs.add_file("/cache/detect-9.1.0.jar");
        fs.add_file("/cache/notes.txt");
        let downloader = CacheOnlyDownloader::new(Arc::new(fs));

        let jar = downloader
            .download("https://repo.example.com/latest/", Path::new("/cache"))
            .unwrap();
        assert_eq!(jar, PathBuf::from("/cache/detect-9.1.0.jar"));
    }

    #[test]
    fn version_numbers_compare_numerically() {
        let fs = MockFileSystem::new();
        fs.add_file("/cache/detect-9.2.0.jar");
        fs.add_file("/cache/detect-10.0.0.jar");
        fs.add_file("/cache/detect-9.10.1.jar");
        let downloader = CacheOnlyDownloader::new(Arc::new(fs));

        let jar = downloader
            .download("https://repo.example.com/latest/", Path::new("/cache"))
            .unwrap();
        assert_eq!(jar, PathBuf::from("/cache/detect-10.0.0.jar"));
    }

    #[test]
    fn version_key_ignores_non_numeric_parts() {
        assert_eq!(version_key(Path::new("/c/synopsys-detect-9.2.0.jar")), vec![9, 2, 0]);
        assert_eq!(version_key(Path::new("/c/detect-latest.jar")), Vec::<u64>::new());
        assert!(
            version_key(Path::new("detect-9.10.1.jar")) > version_key(Path::new("detect-9.2.0.jar"))
        );
    }

    #[test]
    fn missing_artifact_is_a_download_error() {
        let fs = MockFileSystem::new();
        fs.add_dir("/cache");
        let downloader = CacheOnlyDownloader::new(Arc::new(fs));

        match downloader.download("https://repo.example.com/detect-9.0.0.jar", Path::new("/cache")) {
            Err(DetectError::Download { url, reason }) => {
                assert!(url.ends_with("detect-9.0.0.jar"));
                assert!(reason.contains("not present"));
            }
            other => panic!("expected Download error, got {other:?}"),
        }

        match downloader.download("https://repo.example.com/", Path::new("/nowhere")) {
            Err(DetectError::Download { reason, .. }) => assert!(reason.contains("does not exist")),
            other => panic!("expected Download error, got {other:?}"),
        }
    }
}
