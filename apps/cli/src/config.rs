use std::{fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::Context;
use client_core::ListSettings;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "climate.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub service_url: String,
    pub page_size: u32,
    pub debounce_ms: u64,
    pub user: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8080/api".into(),
            page_size: 10,
            debounce_ms: 500,
            user: None,
        }
    }
}

impl Settings {
    pub fn list_settings(&self) -> ListSettings {
        ListSettings::new(self.page_size, Duration::from_millis(self.debounce_ms))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    service_url: Option<String>,
    page_size: Option<u32>,
    debounce_ms: Option<u64>,
    user: Option<String>,
}

/// Defaults, then `path` if it exists, then the process environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let settings = merge_file(Settings::default(), path)?;
    Ok(apply_env(settings, |key| std::env::var(key).ok()))
}

pub fn merge_file(mut settings: Settings, path: &Path) -> anyhow::Result<Settings> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(settings),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
    };
    let file_cfg: FileSettings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;

    if let Some(v) = file_cfg.service_url {
        settings.service_url = v;
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.debounce_ms {
        settings.debounce_ms = v;
    }
    if file_cfg.user.is_some() {
        settings.user = file_cfg.user;
    }
    Ok(settings)
}

pub fn apply_env(mut settings: Settings, var: impl Fn(&str) -> Option<String>) -> Settings {
    if let Some(v) = var("CLIMATE_SERVICE_URL") {
        settings.service_url = v;
    }
    if let Some(v) = var("APP__SERVICE_URL") {
        settings.service_url = v;
    }

    if let Some(v) = var("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.trim().parse::<u32>() {
            settings.page_size = parsed;
        }
    }
    if let Some(v) = var("APP__DEBOUNCE_MS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.debounce_ms = parsed;
        }
    }

    if let Some(v) = var("CLIMATE_USER") {
        settings.user = Some(v);
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
