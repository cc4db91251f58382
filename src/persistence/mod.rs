//! Settings persistence.
//!
//! Settings are stored as JSON strings in a key-value [`SettingsStore`]. The
//! last-used snapshot lives under [`SETTINGS_KEY`]; presets are namespaced
//! with [`PRESETS_PREFIX`]. Logo layers persist only their descriptor; the
//! bitmaps are decoded again from `path` after loading.

pub mod debounce;
pub mod error;
pub mod store;

pub use debounce::DebouncedSave;
pub use error::PersistenceError;
pub use store::{FileStore, MemoryStore, SettingsStore};

use crate::watermark::Settings;

/// Key of the last-used settings snapshot
pub const SETTINGS_KEY: &str = "firemark_settings";
/// Prefix of every preset key
pub const PRESETS_PREFIX: &str = "firemark_preset_";

/// Load the last-used settings.
///
/// Missing, unreadable or corrupt data all yield the default settings; the
/// latter two are logged.
pub fn load_settings(store: &dyn SettingsStore) -> Settings {
    match store.get(SETTINGS_KEY) {
        Ok(Some(json)) => parse_or_default(&json, SETTINGS_KEY),
        Ok(None) => Settings::default(),
        Err(e) => {
            tracing::warn!(key = SETTINGS_KEY, error = %e, "Could not read saved settings, using defaults");
            Settings::default()
        }
    }
}

pub fn save_settings(store: &dyn SettingsStore, settings: &Settings) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(settings)?;
    store.set(SETTINGS_KEY, &json)?;
    tracing::debug!(layers = settings.layers.len(), "Settings saved");
    Ok(())
}

/// Save `settings` as a named preset. Returns the trimmed name.
pub fn save_preset(
    store: &dyn SettingsStore,
    name: &str,
    settings: &Settings,
) -> Result<String, PersistenceError> {
    let name = preset_name(name)?;
    let json = serde_json::to_string(settings)?;
    store.set(&preset_key(&name), &json)?;
    tracing::info!(preset = %name, "Preset saved");
    Ok(name)
}

/// Names of all saved presets, sorted.
pub fn list_presets(store: &dyn SettingsStore) -> Result<Vec<String>, PersistenceError> {
    let mut names: Vec<String> = store
        .keys()?
        .into_iter()
        .filter_map(|key| key.strip_prefix(PRESETS_PREFIX).map(str::to_string))
        .collect();
    names.sort();
    Ok(names)
}

/// Load a preset; `None` if it does not exist.
///
/// A corrupt preset is logged and loads as the default settings.
pub fn load_preset(store: &dyn SettingsStore, name: &str) -> Result<Option<Settings>, PersistenceError> {
    let key = preset_key(name.trim());
    Ok(store.get(&key)?.map(|json| parse_or_default(&json, &key)))
}

pub fn delete_preset(store: &dyn SettingsStore, name: &str) -> Result<bool, PersistenceError> {
    let removed = store.remove(&preset_key(name.trim()))?;
    if removed {
        tracing::info!(preset = %name.trim(), "Preset deleted");
    }
    Ok(removed)
}

fn preset_name(name: &str) -> Result<String, PersistenceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PersistenceError::EmptyPresetName);
    }
    Ok(name.to_string())
}

fn preset_key(name: &str) -> String {
    format!("{}{}", PRESETS_PREFIX, name)
}

fn parse_or_default(json: &str, key: &str) -> Settings {
    serde_json::from_str(json).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "Discarding corrupt settings, using defaults");
        Settings::default()
    })
}
