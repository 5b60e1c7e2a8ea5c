// src/exec/interpreter.rs

//! Pure construction of interpreter paths and launchers.
//!
//! Nothing here touches the filesystem or spawns processes, so the
//! platform-specific rules can be tested on any host.

use std::path::{Path, PathBuf};

use crate::strategy::LaunchTarget;
use crate::types::OsFamily;

/// Path of the Java interpreter.
///
/// With a home directory this is `<home>/bin/java` (`java.exe` on Windows);
/// without one it is the bare `java`, resolved through `PATH` at spawn time.
pub fn interpreter_path(java_home: Option<&Path>, os: OsFamily) -> PathBuf {
    let name = if os.is_windows() { "java.exe" } else { "java" };
    match java_home {
        Some(home) => home.join("bin").join(name),
        None => PathBuf::from(name),
    }
}

/// Program, fixed flags and target that start a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    pub program: PathBuf,
    pub flags: Vec<String>,
    pub target: PathBuf,
    /// Extra variables the launch needs on top of the run environment.
    pub extra_env: Vec<(String, String)>,
}

impl Launcher {
    /// `<java> -jar <jar>`.
    pub fn for_jar(java: PathBuf, jar: PathBuf) -> Self {
        Self {
            program: java,
            flags: vec!["-jar".to_string()],
            target: jar,
            extra_env: Vec::new(),
        }
    }

    /// Shell invocation of the Detect script for `os`.
    pub fn for_script(script: PathBuf, install_dir: Option<&Path>, java_home: Option<&Path>, os: OsFamily) -> Self {
        let (program, flags) = if os.is_windows() {
            (
                PathBuf::from("powershell"),
                ["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"]
                    .map(String::from)
                    .to_vec(),
            )
        } else {
            (PathBuf::from("bash"), Vec::new())
        };

        let mut extra_env = Vec::new();
        if let Some(dir) = install_dir {
            extra_env.push((
                crate::environment::DETECT_JAR_DOWNLOAD_DIR.to_string(),
                dir.display().to_string(),
            ));
        }
        if let Some(home) = java_home {
            extra_env.push((
                crate::environment::JAVA_HOME.to_string(),
                home.display().to_string(),
            ));
        }

        Self {
            program,
            flags,
            target: script,
            extra_env,
        }
    }

    /// Launcher for a prepared target.
    pub fn for_target(target: &LaunchTarget, java_home: Option<&Path>, os: OsFamily) -> Self {
        match target {
            LaunchTarget::Jar(jar) => Self::for_jar(interpreter_path(java_home, os), jar.clone()),
            LaunchTarget::Script { path, install_dir } => {
                Self::for_script(path.clone(), install_dir.as_deref(), java_home, os)
            }
        }
    }

    pub fn is_jar(&self) -> bool {
        self.flags.first().map(String::as_str) == Some("-jar")
    }
}
