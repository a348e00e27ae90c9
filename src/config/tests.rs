use super::{Settings, load_config, load_config_from};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 5000);
    assert_eq!(settings.server.addr(), "127.0.0.1:5000");
    assert_eq!(settings.broker.max_connections, 1000);
    assert!(settings.tracking.strict_identifiers);
    assert_eq!(settings.logging.level, "info");
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("absent");

    let cfg = load_config_from(path.to_str().unwrap()).expect("load_config_from failed");
    assert_eq!(cfg, Settings::default());
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("loadcast.toml");
    fs::write(
        &path,
        r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [tracking]
            strict_identifiers = false
        "#,
    )
    .expect("write config file");

    let cfg = load_config_from(path.to_str().unwrap()).expect("load_config_from failed");
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.port, 9000);
    assert!(!cfg.tracking.strict_identifiers);
    // untouched sections keep their defaults
    assert_eq!(cfg.broker.max_connections, 1000);
    assert_eq!(cfg.logging.level, "info");
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("loadcast.toml");
    fs::write(&path, "[server]\nport = 9000\n").expect("write config file");

    temp_env::with_vars(
        [
            ("LOADCAST__SERVER__PORT", Some("6000")),
            ("LOADCAST__BROKER__MAX_CONNECTIONS", Some("3")),
            ("LOADCAST__LOGGING__LEVEL", Some("debug")),
        ],
        || {
            let cfg = load_config_from(path.to_str().unwrap()).expect("load_config_from failed");
            assert_eq!(cfg.server.port, 6000);
            assert_eq!(cfg.broker.max_connections, 3);
            assert_eq!(cfg.logging.level, "debug");
        },
    );
}

#[test]
#[serial]
fn test_load_config_reads_config_dir() {
    let tmp = TempDir::new().expect("create tempdir");
    let orig = std::env::current_dir().expect("current_dir");
    std::env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    fs::write("config/default.toml", "[broker]\nmax_connections = 10\n")
        .expect("write config file");

    let cfg = load_config();
    std::env::set_current_dir(orig).expect("restore cwd");

    let cfg = cfg.expect("load_config failed");
    assert_eq!(cfg.broker.max_connections, 10);
    assert_eq!(cfg.server.port, 5000);
}

#[test]
#[serial]
fn test_invalid_value_is_an_error() {
    temp_env::with_var("LOADCAST__SERVER__PORT", Some("not-a-port"), || {
        let tmp = TempDir::new().expect("create tempdir");
        let path = tmp.path().join("absent");
        assert!(load_config_from(path.to_str().unwrap()).is_err());
    });
}
