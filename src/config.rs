use crate::error::PathValidationError;
use crate::platform::{default_install_root, is_filesystem_root};
use crate::types::Preferences;
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "loxlaunch";
pub const CONFIG_FILE_NAME: &str = "preferences.json";

pub const CONFIG_PATH_ENV: &str = "LOXLAUNCH_CONFIG_PATH";
pub const INSTALL_PATH_ENV: &str = "LOXLAUNCH_INSTALL_PATH";

pub fn get_preferences_file_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let path = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join(APP_NAME)
        .join(CONFIG_FILE_NAME);
    tracing::debug!("Preferences file path: {}", path.display());
    Ok(path)
}

/// `None` on first run, when no preferences have been saved yet.
pub fn load_preferences() -> Result<Option<Preferences>> {
    load_preferences_from(&get_preferences_file_path()?)
}

pub fn load_preferences_from(path: &Path) -> Result<Option<Preferences>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read preferences file at {}", path.display()))?;
    let prefs: Preferences = serde_json::from_str(&content)
        .with_context(|| format!("Could not parse {} as JSON", path.display()))?;
    Ok(Some(prefs))
}

pub fn save_preferences(prefs: &Preferences) -> Result<()> {
    save_preferences_to(&get_preferences_file_path()?, prefs)
}

/// Write to a temporary file next to `path`, then rename it into place.
pub fn save_preferences_to(path: &Path, prefs: &Preferences) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let content = serde_json::to_string_pretty(prefs)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Could not create temporary file in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("Could not write preferences to {}", path.display()))?;

    tracing::debug!("Saved preferences to {}", path.display());
    Ok(())
}

/// Check that `path` can serve as the installation directory.
///
/// Drive and filesystem roots are refused.
pub fn validate_install_path(path: &Path) -> Result<PathBuf, PathValidationError> {
    if !path.exists() {
        return Err(PathValidationError::Missing(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(PathValidationError::NotADirectory(path.to_path_buf()));
    }
    if is_filesystem_root(path) {
        return Err(PathValidationError::Root(path.to_path_buf()));
    }
    Ok(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
}

pub fn with_install_path(
    prefs: Preferences,
    path: &Path,
) -> Result<Preferences, PathValidationError> {
    let validated = validate_install_path(path)?;
    Ok(Preferences {
        install_path: Some(validated.to_string_lossy().into_owned()),
        last_updated: Some(Utc::now()),
        ..prefs
    })
}

pub fn without_install_path(prefs: Preferences) -> Preferences {
    Preferences {
        install_path: None,
        last_updated: Some(Utc::now()),
        ..prefs
    }
}

pub fn with_shortcut(prefs: Preferences, shortcut: Option<Value>) -> Preferences {
    Preferences {
        shortcut,
        last_updated: Some(Utc::now()),
        ..prefs
    }
}

/// Pick the directory to scan: command line, then environment, then saved
/// preferences, then the platform default.
pub fn resolve_scan_root(cli_path: Option<&Path>, prefs: Option<&Preferences>) -> PathBuf {
    if let Some(path) = cli_path {
        tracing::debug!("Using installation directory from command line");
        return path.to_path_buf();
    }
    if let Some(path) = std::env::var_os(INSTALL_PATH_ENV).filter(|p| !p.is_empty()) {
        tracing::debug!("Using installation directory from {}", INSTALL_PATH_ENV);
        return PathBuf::from(path);
    }
    if let Some(path) = prefs.and_then(|p| p.install_path.as_deref()) {
        tracing::debug!("Using installation directory from preferences");
        return PathBuf::from(path);
    }
    default_install_root()
}

/// Booleans are stored as JSON booleans, anything else as the text given.
pub fn shortcut_value(raw: &str) -> Value {
    match parse_bool(raw) {
        Some(flag) => Value::Bool(flag),
        None => Value::String(raw.to_string()),
    }
}

/// Render a stored value for `config get`; strings without quotes.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

pub fn normalize_key(key: &str) -> String {
    key.replace('-', "_")
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                format!("_{}", c.to_lowercase())
            } else {
                c.to_string()
            }
        })
        .collect::<String>()
        .trim_start_matches('_')
        .to_lowercase()
}
