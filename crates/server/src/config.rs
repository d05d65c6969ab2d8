use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub database_url: String,
    pub body_limit_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            database_url: "sqlite://./data/forms.db".into(),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

/// Defaults, then `server.toml` if present, then `APP__*` variables.
/// `SERVER_BIND` and `DATABASE_URL` are honoured when the matching `APP__`
/// variable is not set.
pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = load_settings_from(Path::new(SETTINGS_FILE))?;

    if std::env::var_os("APP__BIND_ADDR").is_none() {
        if let Ok(v) = std::env::var("SERVER_BIND") {
            settings.bind_addr = v;
        }
    }
    if std::env::var_os("APP__DATABASE_URL").is_none() {
        if let Ok(v) = std::env::var("DATABASE_URL") {
            settings.database_url = v;
        }
    }

    Ok(settings)
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<Settings> {
    let defaults = Settings::default();
    let body_limit = u64::try_from(defaults.body_limit_bytes).unwrap_or(u64::MAX);

    Config::builder()
        .set_default("bind_addr", defaults.bind_addr)?
        .set_default("database_url", defaults.database_url)?
        .set_default("body_limit_bytes", body_limit)?
        .add_source(File::from(path).format(FileFormat::Toml).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("failed to read settings from '{}'", path.display()))?
        .try_deserialize()
        .context("invalid server settings")
}

/// Turns a bare path or `sqlite:` path into a `sqlite://` url. Storage creates
/// missing parent directories when it opens the database.
pub fn prepare_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    let path = raw_database_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_database_url)
        .replace('\\', "/");
    format!("sqlite://{path}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
