//! Database location handling shared by configuration and the store constructor.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

const MEMORY_URL: &str = "sqlite::memory:";

/// Turns a configured database location into a URL sqlx accepts.
///
/// Full URLs and in-memory databases pass through. Bare file paths and
/// `sqlite:` paths become `sqlite://` URLs with forward slashes. A blank
/// value yields `None` so the caller can fall back to its default.
pub fn normalize_database_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with(MEMORY_URL) || raw.contains("://") {
        return Some(raw.to_string());
    }
    let path = raw.strip_prefix("sqlite:").unwrap_or(raw);
    Some(format!("sqlite://{}", path.replace('\\', "/")))
}

/// Filesystem path behind a SQLite URL, without query parameters.
pub(crate) fn database_file(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with(MEMORY_URL) {
        return None;
    }
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);
    (!path.is_empty()).then(|| PathBuf::from(path))
}

pub(crate) fn create_parent_dir(database_url: &str) -> Result<()> {
    let Some(parent) = database_file(database_url)
        .and_then(|file| file.parent().map(PathBuf::from))
        .filter(|parent| !parent.as_os_str().is_empty())
    else {
        return Ok(());
    };

    fs::create_dir_all(&parent).with_context(|| {
        format!(
            "cannot create directory '{}' for database '{database_url}'",
            parent.display()
        )
    })
}

#[cfg(test)]
#[path = "tests/sqlite_url_tests.rs"]
mod tests;
