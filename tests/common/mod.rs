#![allow(dead_code, unused_imports)]

pub use detect_runner_test_utils::builders;
pub use detect_runner_test_utils::fake_downloader::FakeDownloader;
pub use detect_runner_test_utils::{init_tracing, with_timeout};

#[cfg(unix)]
pub use detect_runner_test_utils::fake_java::write_fake_java;
pub use detect_runner_test_utils::fake_java::write_fake_jar;

use std::path::{Path, PathBuf};

/// Canonical form of a temp dir, so paths compare equal to what the
/// runner and the child process report.
pub fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap()
}
