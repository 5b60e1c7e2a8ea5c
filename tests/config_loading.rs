// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use detect_runner::config::{load_and_validate, load_or_default, DEFAULT_DOWNLOAD_URL};
use detect_runner::errors::DetectError;
use detect_runner::types::LogLevel;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_loaded() {
    let file = config_file(
        r#"
[runner]
java_home = "/opt/jdk-17"
tools_directory = "/var/lib/detect"
download_url = "https://repo.example.com/detect/detect-9.0.0.jar"
log_level = "debug"
drain_grace = "250ms"
host_version = "2.440.1"

[detect]
jar = "/opt/detect/detect-9.0.0.jar"
properties = ["--detect.source.path=/tmp/build", "--detect.project.name=demo"]

[environment]
WORKSPACE = "/tmp/build"
DETECT_AIR_GAP = "false"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.runner.java_home, Some(PathBuf::from("/opt/jdk-17")));
    assert_eq!(cfg.tools_directory(), PathBuf::from("/var/lib/detect"));
    assert_eq!(
        cfg.runner.download_url,
        "https://repo.example.com/detect/detect-9.0.0.jar"
    );
    assert_eq!(cfg.runner.log_level, LogLevel::Debug);
    assert_eq!(cfg.drain_grace(), Duration::from_millis(250));
    assert_eq!(cfg.runner.host_version.as_deref(), Some("2.440.1"));
    assert_eq!(
        cfg.detect.jar,
        Some(PathBuf::from("/opt/detect/detect-9.0.0.jar"))
    );
    assert_eq!(
        cfg.detect.properties,
        vec!["--detect.source.path=/tmp/build", "--detect.project.name=demo"]
    );
    assert_eq!(cfg.environment.get("WORKSPACE").map(String::as_str), Some("/tmp/build"));
}

#[test]
fn empty_config_uses_defaults() {
    let file = config_file("");

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.runner.download_url, DEFAULT_DOWNLOAD_URL);
    assert_eq!(cfg.runner.log_level, LogLevel::Info);
    assert_eq!(cfg.drain_grace(), Duration::from_secs(5));
    assert!(cfg.detect.properties.is_empty());
    assert!(cfg.environment.is_empty());
}

#[test]
fn explicit_path_that_does_not_exist_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("detect-runner.toml");

    match load_or_default(Some(&missing)) {
        Err(DetectError::IoError(_)) => {}
        Err(e) => panic!("Expected IoError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn malformed_toml_returns_toml_error() {
    let file = config_file("[runner\njava_home = ");

    match load_and_validate(file.path()) {
        Err(DetectError::TomlError(_)) => {}
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn wrong_log_level_is_rejected_at_parse_time() {
    let file = config_file("[runner]\nlog_level = \"loud\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(DetectError::TomlError(_))
    ));
}

#[test]
fn bad_drain_grace_returns_config_error() {
    let file = config_file("[runner]\ndrain_grace = \"soon\"\n");

    match load_and_validate(file.path()) {
        Err(DetectError::ConfigError(msg)) => {
            assert!(msg.contains("drain_grace"), "{msg}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn malformed_property_returns_config_error() {
    let file = config_file(
        r#"
[detect]
properties = ["--detect.source.path=/tmp/build", "detect.project.name=demo"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(DetectError::ConfigError(msg)) => {
            assert!(msg.contains("detect.project.name=demo"), "{msg}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn jar_and_script_together_return_config_error() {
    let file = config_file(
        r#"
[detect]
jar = "/opt/detect.jar"
script = "/opt/detect.sh"
"#,
    );

    match load_and_validate(file.path()) {
        Err(DetectError::ConfigError(msg)) => {
            assert!(msg.contains("mutually exclusive"), "{msg}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn unsupported_url_scheme_returns_config_error() {
    let file = config_file("[runner]\ndownload_url = \"ftp://mirror/detect.jar\"\n");

    match load_and_validate(file.path()) {
        Err(DetectError::ConfigError(msg)) => {
            assert!(msg.contains("ftp://mirror/detect.jar"), "{msg}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}
