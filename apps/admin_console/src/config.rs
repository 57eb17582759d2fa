use std::{fs, io, path::Path};

use anyhow::Context;
use client_core::UiConfig;

pub const DEFAULT_CONFIG_FILE: &str = "admin_console.toml";

/// Defaults, then the TOML file if present, then environment overrides.
pub fn load_settings(path: &Path) -> anyhow::Result<UiConfig> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<UiConfig>(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => UiConfig::default(),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

/// Applies `ADMIN_*` and `APP__*` variables; the `APP__` form wins.
pub fn apply_env_overrides(settings: &mut UiConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("ADMIN_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = lookup("APP__API_PREFIX") {
        settings.api_prefix = v;
    }

    if let Some(v) = lookup("ADMIN_REQUEST_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_ms = parsed;
        }
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_ms = parsed;
        }
    }

    if let Some(v) = lookup("APP__NOTIFICATION_DURATION_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.notification_duration_ms = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
