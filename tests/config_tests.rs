// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::time::Duration;

use tempfile::TempDir;
use wmclient::config::ClientConfig;
use wmclient::{ErrorKind, WmError};

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ClientConfig::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn test_toml_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = ClientConfig {
        host: "wm.internal".to_string(),
        port: 9080,
        base_path: "/detect".to_string(),
        cache_size: Some(100_000),
        capabilities: Some(vec!["brand_name".to_string(), "is_app".to_string()]),
        ..ClientConfig::default()
    };
    config.save_to(&path).unwrap();

    let loaded = ClientConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_json_file_is_detected_by_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"host": "10.0.0.5", "timeout_ms": 2500}"#).unwrap();

    let config = ClientConfig::load_from(&path).unwrap();
    assert_eq!(config.host, "10.0.0.5");
    assert_eq!(config.timeout(), Duration::from_millis(2500));
    assert_eq!(config.port, 8080);
}

#[test]
fn test_malformed_toml_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    let err = ClientConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, WmError::Toml(_)));
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_validate_rejects_zero_timeout() {
    let config = ClientConfig {
        timeout_ms: 0,
        ..ClientConfig::default()
    };
    assert!(matches!(config.validate(), Err(WmError::Config(_))));
}

#[test]
fn test_env_overrides_take_priority() {
    // Only this test touches WM_* variables.
    std::env::set_var("WM_HOST", "env-host");
    std::env::set_var("WM_PORT", "18080");
    std::env::set_var("WM_CACHE_SIZE", "42");

    let mut config = ClientConfig {
        host: "file-host".to_string(),
        ..ClientConfig::default()
    };
    let applied = config.apply_env_overrides();

    std::env::set_var("WM_PORT", "not-a-port");
    let mut broken = ClientConfig::default();
    let rejected = broken.apply_env_overrides();

    std::env::remove_var("WM_HOST");
    std::env::remove_var("WM_PORT");
    std::env::remove_var("WM_CACHE_SIZE");

    applied.unwrap();
    assert_eq!(config.host, "env-host");
    assert_eq!(config.port, 18080);
    assert_eq!(config.cache_size, Some(42));
    assert!(matches!(rejected, Err(WmError::Config(_))));
}

#[test]
fn test_wmclient_home_env_sets_default_path() {
    let dir = TempDir::new().unwrap();
    std::env::set_var("WMCLIENT_HOME", dir.path());
    let path = ClientConfig::default_path();
    std::env::remove_var("WMCLIENT_HOME");

    assert_eq!(path, dir.path().join("config.toml"));
}
