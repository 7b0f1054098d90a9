// src/settings/mod.rs
// The settings singleton row (id = "1"): generation parameters plus the
// rotation state the scheduler reads and writes.

pub mod admin;
pub mod store;

pub use admin::{AdminSetting, AdminSettingsStore};
pub use store::SettingsStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row id of the singleton settings record.
pub const SETTINGS_ROW_ID: &str = "1";

// Defaults applied when the row is created lazily on first read.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: i64 = 1000;
pub const DEFAULT_ROTATION_INTERVAL_MINUTES: i64 = 360;
pub const DEFAULT_MODEL_NAME: &str = "gpt-4o";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: String,
    pub temperature: f64,
    pub max_tokens: i64,
    /// Target period in minutes after which rotation is guaranteed.
    pub rotation_interval: i64,
    pub model_name: String,
    pub selected_persona_id: Option<String>,
    pub last_rotation: Option<DateTime<Utc>>,
}

impl Settings {
    /// The default row inserted lazily on first read.
    pub fn default_row() -> Self {
        Self {
            id: SETTINGS_ROW_ID.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            rotation_interval: DEFAULT_ROTATION_INTERVAL_MINUTES,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            selected_persona_id: None,
            last_rotation: None,
        }
    }
}

/// Validated payload for the settings upsert.
#[derive(Debug, Clone)]
pub struct SettingsUpdate {
    pub temperature: f64,
    pub max_tokens: i64,
    pub rotation_interval: i64,
    pub model_name: String,
    pub selected_persona_id: Option<String>,
}
