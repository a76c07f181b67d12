use std::{collections::HashMap, fs, net::SocketAddr};

use anyhow::Context;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub page_title: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
            database_url: "sqlite://./inventory.db".into(),
            page_title: "Inventory".into(),
        }
    }
}

impl Settings {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .with_context(|| format!("invalid bind address '{raw}'"))
    }

    /// The configured database as a URL the store can open; blank means the default.
    pub fn database_url(&self) -> String {
        storage::normalize_database_url(&self.database_url)
            .unwrap_or_else(|| Self::default().database_url)
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    settings_from_sources(file.as_deref(), |key| std::env::var(key).ok())
}

/// Layers `server.toml` contents and then environment variables over the
/// defaults. Later sources win; unusable port values keep the previous one.
pub fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("host") {
                    settings.host = v.clone();
                }
                if let Some(v) = file_cfg.get("port") {
                    apply_port(&mut settings, v, "server.toml");
                }
                if let Some(v) = file_cfg.get("database_url") {
                    settings.database_url = v.clone();
                }
                if let Some(v) = file_cfg.get("page_title") {
                    settings.page_title = v.clone();
                }
            }
            Err(error) => warn!(%error, "ignoring unreadable server.toml"),
        }
    }

    if let Some(v) = env("APP__HOST") {
        settings.host = v;
    }

    if let Some(v) = env("PORT") {
        apply_port(&mut settings, &v, "PORT");
    }
    if let Some(v) = env("APP__PORT") {
        apply_port(&mut settings, &v, "APP__PORT");
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__PAGE_TITLE") {
        settings.page_title = v;
    }

    settings
}

fn apply_port(settings: &mut Settings, raw: &str, source: &str) {
    match raw.trim().parse::<u16>() {
        Ok(port) => settings.port = port,
        Err(_) => warn!(source, value = raw, "ignoring invalid port"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
