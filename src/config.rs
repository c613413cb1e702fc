//! Persisted filter settings (`~/.config/chatmin/config.json`).
//!
//! Settings load once at startup and are written through on every mutation.
//! Corrupt or unrecognized persisted values fall back per field to the
//! in-memory defaults; save failures are logged and never propagated, so the
//! in-memory settings stay correct even when the on-disk copy lags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::mode::{BackfillMode, DisplayMode};

pub const CONFIG_FILE: &str = "config.json";
const CONFIG_DIR_ENV: &str = "CHATMIN_CONFIG_DIR";

/// The two persisted settings. Everything else (the buffer included) is
/// memory-only and resets at process start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSettings {
    pub mode: DisplayMode,
    pub backfill: BackfillMode,
}

/// Raw on-disk shape; tokens are validated field by field so one bad value
/// does not discard the other.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    backfill: Option<String>,
}

/// Resolve the config directory: env override first, then the platform dir.
fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::config_dir().map(|dir| dir.join("chatmin"))
}

/// Resolve the default config file path.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Load settings from `path`, falling back to defaults for anything
/// missing or unparseable.
pub fn load_settings(path: &Path) -> FilterSettings {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return FilterSettings::default(),
    };
    parse_settings(&contents)
}

fn parse_settings(contents: &str) -> FilterSettings {
    let raw: RawSettings = match serde_json::from_str(contents) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(%err, "unreadable settings file, using defaults");
            return FilterSettings::default();
        }
    };

    let mut settings = FilterSettings::default();
    if let Some(token) = raw.mode {
        match DisplayMode::parse_token(&token) {
            Ok(mode) => settings.mode = mode,
            Err(err) => warn!(%err, "ignoring persisted display mode"),
        }
    }
    if let Some(token) = raw.backfill {
        match BackfillMode::parse_token(&token) {
            Ok(backfill) => settings.backfill = backfill,
            Err(err) => warn!(%err, "ignoring persisted backfill mode"),
        }
    }
    settings
}

fn serialize_settings(settings: &FilterSettings) -> String {
    let value = json!({
        "mode": settings.mode.token(),
        "backfill": settings.backfill.token(),
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

/// Save settings to `path`, creating parent directories as needed. Errors are
/// logged and swallowed.
pub fn save_settings(path: &Path, settings: &FilterSettings) {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            warn!(
                %err,
                dir = %parent.display(),
                "failed to create settings directory"
            );
            return;
        }
    }
    if let Err(err) = fs::write(path, serialize_settings(settings)) {
        warn!(%err, path = %path.display(), "failed to write settings");
    }
}
