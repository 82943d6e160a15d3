//! Durable UI preferences. Only the dark-mode flag lives here today.

use tracing::{debug, warn};

use crate::TsError;

pub const DARK_CLASS: &str = "dark-mode";

/// Per-origin string storage that survives reloads (localStorage in the browser).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), TsError>;
}

#[derive(Debug)]
pub struct DarkMode<S> {
    store: S,
    key: String,
    enabled: bool,
}

impl<S: KeyValueStore> DarkMode<S> {
    /// Read the saved flag. Anything other than `"true"` counts as off.
    pub fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let enabled = store.get(&key).as_deref() == Some("true");
        debug!(%key, enabled, "loaded dark mode preference");
        Self {
            store,
            key,
            enabled,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the flag and write it back straight away. A failed write keeps
    /// the new in-memory state; the page just won't remember it.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        let value = if self.enabled { "true" } else { "false" };
        if let Err(err) = self.store.set(&self.key, value) {
            warn!(error = %err, key = %self.key, "could not persist dark mode");
        }
        self.enabled
    }
}
