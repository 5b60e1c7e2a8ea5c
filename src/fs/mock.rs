// src/fs/mock.rs

use super::{has_extension, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File,
    /// Child names.
    Dir(Vec<String>),
}

/// In-memory filesystem for strategy and download tests.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file; parent directories are created implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.lock();
        entries.insert(path.clone(), MockEntry::File);
        Self::link_to_parent(&mut entries, &path);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.lock();
        entries
            .entry(path.clone())
            .or_insert_with(|| MockEntry::Dir(Vec::new()));
        Self::link_to_parent(&mut entries, &path);
    }

    fn link_to_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let Some(parent) = path.parent() else {
            return;
        };
        if parent.as_os_str().is_empty() || parent == path {
            return;
        }
        if !entries.contains_key(parent) {
            entries.insert(parent.to_path_buf(), MockEntry::Dir(Vec::new()));
            Self::link_to_parent(entries, parent);
        }
        if let (Some(MockEntry::Dir(children)), Some(name)) = (
            entries.get_mut(parent),
            path.file_name().and_then(|n| n.to_str()),
        ) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, MockEntry>> {
        // A poisoned map is still structurally valid.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FileSystem for MockFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::File))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().get(path), Some(MockEntry::Dir(_)))
    }

    /// Registered paths are taken to be canonical already.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        if self.lock().contains_key(path) {
            Ok(path.to_path_buf())
        } else {
            Err(anyhow!("no such file: {}", path.display()))
        }
    }

    fn files_with_extension(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let entries = self.lock();
        let Some(MockEntry::Dir(children)) = entries.get(dir) else {
            return Err(anyhow!("not a directory: {}", dir.display()));
        };
        let mut files: Vec<PathBuf> = children
            .iter()
            .map(|name| dir.join(name))
            .filter(|p| has_extension(p, extension))
            .filter(|p| matches!(entries.get(p), Some(MockEntry::File)))
            .collect();
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_create_their_parent_directories() {
        let fs = MockFileSystem::new();
        fs.add_file("/tools/detect/detect-9.0.0.jar");

        assert!(fs.is_file(Path::new("/tools/detect/detect-9.0.0.jar")));
        assert!(fs.is_dir(Path::new("/tools/detect")));
        assert!(fs.is_dir(Path::new("/tools")));
        assert_eq!(
            fs.files_with_extension(Path::new("/tools/detect"), "jar").unwrap(),
            vec![PathBuf::from("/tools/detect/detect-9.0.0.jar")]
        );
        assert!(fs.files_with_extension(Path::new("/nowhere"), "jar").is_err());
    }
}
