//! Save/load persistence
//!
//! Features:
//! - `Store` backends (memory with quota, atomic files, browser LocalStorage)
//! - Versioned run snapshot with field-by-field sanitization
//! - Fire-and-forget writes: failures are logged and never reach the game

pub mod sanitize;
pub mod save;
pub mod store;

pub use save::{RunSaveData, SAVE_VERSION};
#[cfg(target_arch = "wasm32")]
pub use store::LocalStore;
pub use store::{FileStore, MemoryStore, Store, StoreError};

/// Store key of the run snapshot
pub const RUN_KEY: &str = "wildland_survivor_run";
/// Store key of the settings
pub const SETTINGS_KEY: &str = "wildland_survivor_settings";

/// Load the run snapshot, if one exists and is readable
pub fn load_run<S: Store + ?Sized>(store: &S, key: &str) -> Option<RunSaveData> {
    match store.load(key) {
        Ok(Some(text)) => RunSaveData::from_json(&text),
        Ok(None) => None,
        Err(e) => {
            log::warn!("Failed to load run '{}': {}", key, e);
            None
        }
    }
}

/// Write the run snapshot. Returns whether the write landed.
pub fn save_run<S: Store + ?Sized>(store: &mut S, key: &str, data: &RunSaveData) -> bool {
    let result = data
        .to_json()
        .map_err(StoreError::from)
        .and_then(|json| store.save(key, &json));
    match result {
        Ok(()) => {
            log::debug!("Run saved under '{}'", key);
            true
        }
        Err(e) => {
            log::warn!("Failed to save run '{}': {}", key, e);
            false
        }
    }
}

/// Delete the run snapshot
pub fn remove_run<S: Store + ?Sized>(store: &mut S, key: &str) {
    if let Err(e) = store.remove(key) {
        log::warn!("Failed to remove run '{}': {}", key, e);
    }
}
