//! Game settings and preferences
//!
//! Persisted separately from run saves through the same `Store`.

use serde::Serialize;

use crate::persistence::sanitize;
use crate::persistence::{SETTINGS_KEY, Store, StoreError};

/// Autosave interval bounds (seconds of simulated time)
const AUTOSAVE_RANGE: (f32, f32) = (1.0, 120.0);

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    // === Host presentation ===
    pub muted: bool,
    pub fullscreen: bool,

    // === Persistence ===
    /// Seconds of simulated time between autosaves
    pub autosave_interval_secs: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            fullscreen: false,
            autosave_interval_secs: 5.0,
        }
    }
}

impl Settings {
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    /// Parse untrusted JSON, keeping defaults for anything malformed
    pub fn from_json(text: &str) -> Self {
        let d = Self::default();
        let Ok(serde_json::Value::Object(obj)) = serde_json::from_str(text) else {
            return d;
        };
        Self {
            muted: sanitize::bool_or(&obj, "muted", d.muted),
            fullscreen: sanitize::bool_or(&obj, "fullscreen", d.fullscreen),
            autosave_interval_secs: sanitize::f32_or(
                &obj,
                "autosave_interval_secs",
                d.autosave_interval_secs,
            )
            .clamp(AUTOSAVE_RANGE.0, AUTOSAVE_RANGE.1),
        }
    }

    /// Load settings from the store
    pub fn load<S: Store + ?Sized>(store: &S) -> Self {
        match store.load(SETTINGS_KEY) {
            Ok(Some(json)) => {
                log::info!("Loaded settings");
                Self::from_json(&json)
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to load settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings to the store
    pub fn save<S: Store + ?Sized>(&self, store: &mut S) {
        let result = serde_json::to_string(self)
            .map_err(StoreError::from)
            .and_then(|json| store.save(SETTINGS_KEY, &json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}
