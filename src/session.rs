//! Per-session browsing state.
//!
//! Theme, favorites and the comparison set used to live in ambient
//! browser storage; here they are an explicit state object persisted
//! through an injected key-value interface. State is read once per
//! request and written back on every change.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

/// Site color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// State owned by one browsing session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub favorites: BTreeSet<u32>,
    #[serde(default)]
    pub compare: BTreeSet<u32>,
}

impl SessionState {
    /// Load session state from the store, falling back to defaults for
    /// new sessions or unreadable entries.
    pub fn load(store: &dyn KeyValueStore, sid: &str) -> Self {
        store
            .get(&session_key(sid))
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Persist the state. Called after every mutation.
    pub fn save(&self, store: &dyn KeyValueStore, sid: &str) {
        match serde_json::to_string(self) {
            Ok(raw) => store.set(&session_key(sid), raw),
            Err(e) => tracing::warn!("Failed to serialize session {}: {}", sid, e),
        }
    }

    /// Toggle a hotel in the favorites set; returns the new membership
    pub fn toggle_favorite(&mut self, hotel_id: u32) -> bool {
        if !self.favorites.remove(&hotel_id) {
            self.favorites.insert(hotel_id);
            true
        } else {
            false
        }
    }

    /// Toggle a hotel in the comparison set; returns the new membership
    pub fn toggle_compare(&mut self, hotel_id: u32) -> bool {
        if !self.compare.remove(&hotel_id) {
            self.compare.insert(hotel_id);
            true
        } else {
            false
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }
}

fn session_key(sid: &str) -> String {
    format!("session:{sid}")
}

/// Minimal key-value storage seam for session persistence
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// Process-local store, sufficient for a single-instance site
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key.to_string(), value);
        }
    }
}
