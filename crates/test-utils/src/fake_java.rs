//! Shell scripts standing in for `java` in process tests (Unix only).

use std::fs;
use std::path::{Path, PathBuf};

/// Create `<home>/bin/java` running `body` under `/bin/sh`, and return
/// `home` for use as a java home.
///
/// The script sees the real argument list, so `body` can inspect `$@`
/// (e.g. `$2` is the jar path after `-jar`).
#[cfg(unix)]
pub fn write_fake_java(home: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin = home.join("bin");
    fs::create_dir_all(&bin).expect("create fake java bin dir");
    let java = bin.join("java");
    fs::write(&java, format!("#!/bin/sh\n{body}\n")).expect("write fake java");
    let mut perms = fs::metadata(&java).expect("stat fake java").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&java, perms).expect("chmod fake java");
    home.to_path_buf()
}

/// Create an (empty) jar file the runner can point at.
pub fn write_fake_jar(dir: &Path, name: &str) -> PathBuf {
    let jar = dir.join(name);
    fs::write(&jar, b"PK").expect("write fake jar");
    jar
}
