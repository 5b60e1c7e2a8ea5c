use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use detect_runner::errors::{DetectError, Result};
use detect_runner::strategy::ExecutableDownloader;

/// A fake downloader that:
/// - records every `(url, target_dir)` it was asked for
/// - hands back a fixed path, or fails if none was configured.
#[derive(Debug, Clone, Default)]
pub struct FakeDownloader {
    result: Option<PathBuf>,
    requests: Arc<Mutex<Vec<(String, PathBuf)>>>,
}

impl FakeDownloader {
    pub fn returning(path: impl Into<PathBuf>) -> Self {
        Self {
            result: Some(path.into()),
            requests: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<(String, PathBuf)> {
        self.requests.lock().unwrap().clone()
    }
}

impl ExecutableDownloader for FakeDownloader {
    fn download(&self, url: &str, target_dir: &Path) -> Result<PathBuf> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), target_dir.to_path_buf()));

        self.result.clone().ok_or_else(|| DetectError::Download {
            url: url.to_string(),
            reason: "offline".to_string(),
        })
    }
}
