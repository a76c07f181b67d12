use super::{settings_from_sources, Settings};

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_listen_on_port_8000() {
    let settings = settings_from_sources(None, env_from(&[]));
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.port, 8000);
    assert_eq!(
        settings.bind_addr().expect("addr").to_string(),
        "0.0.0.0:8000"
    );
}

#[test]
fn port_env_overrides_default() {
    let settings = settings_from_sources(None, env_from(&[("PORT", "9100")]));
    assert_eq!(settings.port, 9100);
}

#[test]
fn prefixed_env_wins_over_plain_env_and_file() {
    let file = r#"
        port = "7000"
        database_url = "sqlite://./from_file.db"
    "#;
    let settings = settings_from_sources(
        Some(file),
        env_from(&[
            ("PORT", "7100"),
            ("APP__PORT", "7200"),
            ("DATABASE_URL", "sqlite://./from_env.db"),
        ]),
    );
    assert_eq!(settings.port, 7200);
    assert_eq!(settings.database_url, "sqlite://./from_env.db");
}

#[test]
fn file_values_apply_when_env_is_silent() {
    let file = r#"
        host = "127.0.0.1"
        port = "8123"
        page_title = "Back room"
    "#;
    let settings = settings_from_sources(Some(file), env_from(&[]));
    assert_eq!(settings.host, "127.0.0.1");
    assert_eq!(settings.port, 8123);
    assert_eq!(settings.page_title, "Back room");
}

#[test]
fn invalid_port_keeps_previous_value() {
    let settings = settings_from_sources(None, env_from(&[("PORT", "eighty")]));
    assert_eq!(settings.port, 8000);

    let settings = settings_from_sources(None, env_from(&[("PORT", "70000")]));
    assert_eq!(settings.port, 8000);
}

#[test]
fn unreadable_file_falls_back_to_defaults() {
    let settings = settings_from_sources(Some("port = [1, 2"), env_from(&[]));
    assert_eq!(settings, Settings::default());
}

#[test]
fn invalid_host_is_reported_by_bind_addr() {
    let settings = settings_from_sources(None, env_from(&[("APP__HOST", "not a host")]));
    assert!(settings.bind_addr().is_err());
}

#[test]
fn database_url_is_normalized_for_the_store() {
    let settings = settings_from_sources(
        None,
        env_from(&[("DATABASE_URL", "./data/inventory.db")]),
    );
    assert_eq!(settings.database_url(), "sqlite://./data/inventory.db");

    let settings = settings_from_sources(None, env_from(&[("APP__DATABASE_URL", "sqlite::memory:")]));
    assert_eq!(settings.database_url(), "sqlite::memory:");
}

#[test]
fn blank_database_url_uses_default() {
    let settings = settings_from_sources(None, env_from(&[("DATABASE_URL", "   ")]));
    assert_eq!(settings.database_url(), Settings::default().database_url);
}

#[tokio::test]
async fn normalized_database_url_creates_openable_sqlite_file() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("inventory.db");

    let settings = Settings {
        database_url: db_path.to_string_lossy().into_owned(),
        ..Settings::default()
    };
    let storage = storage::Storage::new(&settings.database_url())
        .await
        .expect("open sqlite");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should be created: {}",
        db_path.display()
    );
}
