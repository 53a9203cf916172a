//! Calendar accounts

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::LOCAL_PRESET;
use crate::id::AccountId;

/// The kind of provider that serves an account
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderType {
    /// Data lives on the device only
    Local,
    /// Data lives on a CalDAV server
    Caldav,
}

impl ProviderType {
    /// The provider type that serves accounts created from this preset
    pub fn for_preset(preset: &str) -> Self {
        if preset == LOCAL_PRESET {
            ProviderType::Local
        } else {
            ProviderType::Caldav
        }
    }
}

/// A calendar account
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    preset: String,
    provider_type: ProviderType,

    user: Option<String>,
    password: Option<String>,
    server_url: Option<Url>,
    /// The calendar home set, as discovered on the server
    calendar_home: Option<Url>,
}

impl Account {
    /// Create an account from a preset name (e.g. `"local"`, `"caldav"`).
    /// This picks a new (random) account ID.
    pub fn from_preset(preset: &str) -> Self {
        Self {
            id: AccountId::random(),
            preset: preset.to_string(),
            provider_type: ProviderType::for_preset(preset),
            user: None,
            password: None,
            server_url: None,
            calendar_home: None,
        }
    }

    /// Create a networked account
    pub fn new_remote(preset: &str, server_url: Url, user: String, password: String) -> Self {
        Self {
            provider_type: ProviderType::Caldav,
            user: Some(user),
            password: Some(password),
            server_url: Some(server_url),
            ..Self::from_preset(preset)
        }
    }

    pub fn id(&self) -> &AccountId { &self.id }
    pub fn preset(&self) -> &str { &self.preset }
    pub fn provider_type(&self) -> ProviderType { self.provider_type }
    pub fn user(&self) -> Option<&str> { self.user.as_deref() }
    pub fn password(&self) -> Option<&str> { self.password.as_deref() }
    pub fn server_url(&self) -> Option<&Url> { self.server_url.as_ref() }
    pub fn calendar_home(&self) -> Option<&Url> { self.calendar_home.as_ref() }

    pub fn set_id(&mut self, id: AccountId) {
        self.id = id;
    }
    pub fn set_provider_type(&mut self, provider_type: ProviderType) {
        self.provider_type = provider_type;
    }
    pub fn set_calendar_home(&mut self, url: Option<Url>) {
        self.calendar_home = url;
    }
}
