use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Saved user preferences.
///
/// Only `install_path` matters for discovery. `shortcut` belongs to the
/// desktop integration and is stored as whatever JSON value it was given.
/// Keys this version does not know about survive a load/save cycle in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Preferences {
    #[serde(default, alias = "InstallPath")]
    pub install_path: Option<String>,
    #[serde(default, alias = "ShortcutPreference")]
    pub shortcut: Option<Value>,
    #[serde(default, alias = "LastUpdated")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
    Yaml,
}
