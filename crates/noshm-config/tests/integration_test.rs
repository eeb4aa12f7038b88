//! Integration tests for noshm-config
//!
//! These tests verify the config loading pipeline with real file system operations.

use std::path::PathBuf;
use tempfile::tempdir;

/// Test config loading from a real config file
#[test]
fn test_load_config_from_file() {
    let temp = tempdir().unwrap();
    let noshm_dir = temp.path().join(".noshm");
    std::fs::create_dir_all(&noshm_dir).unwrap();

    let config_content = r#"
[library]
real = "/usr/lib/x86_64-linux-gnu/libXext.so.6"

[logging]
level = "debug"
file = "/var/log/noshm.log"
"#;
    let path = noshm_dir.join("config.toml");
    std::fs::write(&path, config_content).unwrap();

    let config = noshm_config::Config::load_from(&path).unwrap();

    assert_eq!(config.library.real, "/usr/lib/x86_64-linux-gnu/libXext.so.6");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.logging.file,
        Some(PathBuf::from("/var/log/noshm.log"))
    );
}

/// Env overrides win over whatever the file said
#[test]
fn test_file_then_overrides() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[library]\nreal = \"libXext.so\"\n").unwrap();

    let mut config = noshm_config::Config::load_from(&path).unwrap();
    config.apply_overrides(|key| {
        (key == noshm_config::REAL_LIBRARY_ENV).then(|| "libX11.so.6".to_string())
    });

    assert_eq!(config.library.real, "libX11.so.6");
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_malformed_file_is_a_toml_error() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[library\nreal = ").unwrap();

    let err = noshm_config::Config::load_from(&path).unwrap_err();
    assert!(matches!(err, noshm_config::ConfigError::Toml(_)));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let temp = tempdir().unwrap();
    let err = noshm_config::Config::load_from(&temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, noshm_config::ConfigError::Io(_)));
}

/// Default TOML written to disk loads back to the defaults
#[test]
fn test_default_toml_loads_back() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, noshm_config::Config::default_toml()).unwrap();

    let loaded = noshm_config::Config::load_from(&path).unwrap();
    assert_eq!(loaded, noshm_config::Config::default());
}
