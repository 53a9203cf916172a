//! Localized strings

use std::collections::HashMap;

use crate::config::DEFAULT_L10N;

/// A host localization service
pub trait Localizer: Send + Sync {
    /// Returns the localized string for `key`
    fn get(&self, key: &str) -> String;
}

/// A localizer backed by an in-memory catalogue, that falls back to the built-in strings
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    strings: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.strings.insert(key.to_string(), value.to_string());
        self
    }
}

impl Localizer for Catalog {
    fn get(&self, key: &str) -> String {
        if let Some(value) = self.strings.get(key) {
            return value.clone();
        }
        match DEFAULT_L10N.get(key) {
            Some(value) => value.to_string(),
            None => {
                log::warn!("Missing l10n string {}", key);
                key.to_string()
            },
        }
    }
}
