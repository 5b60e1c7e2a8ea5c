// src/fs/mod.rs

//! Filesystem access used while locating Detect.
//!
//! Strategy preparation and the cache lookup go through [`FileSystem`] so
//! they can be tested against [`mock::MockFileSystem`].

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

pub trait FileSystem: Send + Sync + Debug {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Regular files directly inside `dir` whose extension matches
    /// `extension` (ASCII case-insensitive), sorted by path.
    fn files_with_extension(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>>;
}

pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).with_context(|| format!("resolving {}", path.display()))
    }

    fn files_with_extension(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
            let path = entry?.path();
            if has_extension(&path, extension) && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_matching_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("detect-9.1.0.jar"), b"PK").unwrap();
        fs::write(dir.path().join("detect-8.9.0.JAR"), b"PK").unwrap();
        fs::write(dir.path().join("detect.sh"), b"").unwrap();
        fs::create_dir(dir.path().join("old.jar")).unwrap();

        let jars = RealFileSystem
            .files_with_extension(dir.path(), "jar")
            .unwrap();

        assert_eq!(
            jars,
            vec![
                dir.path().join("detect-8.9.0.JAR"),
                dir.path().join("detect-9.1.0.jar"),
            ]
        );
    }
}
