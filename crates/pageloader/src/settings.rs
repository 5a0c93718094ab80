//! Persisted settings
//!
//! String key/value storage with path-like keys, the UI config stored in it
//! and the accumulated error log.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Canonical keys, all under one root
pub mod keys {
    pub const LANGUAGE: &str = "/webui/language";
    pub const CONFIG: &str = "/webui/config";
    pub const ERROR_LOG: &str = "/webui/error";
}

/// String-valued key/value store
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Volatile store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Store persisted as a JSON object in one file, rewritten on every change
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open `path`. A missing or corrupt file starts an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt settings file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Cannot read settings file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    fn flush(&self) {
        let result = serde_json::to_string_pretty(&self.values)
            .map_err(std::io::Error::other)
            .and_then(|text| std::fs::write(&self.path, text));
        if let Err(e) = result {
            tracing::warn!("Failed to persist settings to {}: {}", self.path.display(), e);
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.flush();
        }
    }
}

/// Persisted UI switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiConfig {
    pub disable_fullscreen: bool,
    pub enable_system_font: bool,
}

impl UiConfig {
    /// Read the config, writing the default back when it is absent or
    /// unparsable
    pub fn load(store: &mut dyn SettingsStore) -> Self {
        if let Some(text) = store.get(keys::CONFIG) {
            match serde_json::from_str(&text) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Malformed UI config, using defaults: {}", e),
            }
        }
        let config = Self::default();
        config.save(store);
        config
    }

    pub fn save(&self, store: &mut dyn SettingsStore) {
        match serde_json::to_string(self) {
            Ok(text) => store.set(keys::CONFIG, &text),
            Err(e) => tracing::warn!("Cannot serialize UI config: {}", e),
        }
    }
}

/// Newline-joined error history
pub struct ErrorLog;

impl ErrorLog {
    /// Append `place: issue` and return the full log
    pub fn record(store: &mut dyn SettingsStore, place: &str, issue: &str) -> String {
        let entry = format!("{place}: {issue}");
        let log = match store.get(keys::ERROR_LOG) {
            Some(previous) if !previous.is_empty() => format!("{previous}\n{entry}"),
            _ => entry,
        };
        store.set(keys::ERROR_LOG, &log);
        log
    }

    /// Recorded entries, oldest first
    pub fn entries(store: &dyn SettingsStore) -> Vec<String> {
        store
            .get(keys::ERROR_LOG)
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn clear(store: &mut dyn SettingsStore) {
        store.remove(keys::ERROR_LOG);
    }
}
