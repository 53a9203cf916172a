//! Calendars and what they allow

use serde::{Deserialize, Serialize};
use bitflags::bitflags;
use url::Url;

use crate::error::DynError;
use crate::id::{AccountId, CalendarId};

bitflags! {
    /// What a calendar (or an event in it) lets the user do
    #[derive(Serialize, Deserialize)]
    pub struct Capabilities: u8 {
        const CREATE_EVENT = 1;
        const UPDATE_EVENT = 2;
        const DELETE_EVENT = 4;
    }
}

impl Capabilities {
    pub fn can_create_event(&self) -> bool { self.contains(Self::CREATE_EVENT) }
    pub fn can_update_event(&self) -> bool { self.contains(Self::UPDATE_EVENT) }
    pub fn can_delete_event(&self) -> bool { self.contains(Self::DELETE_EVENT) }
}

/// A calendar, that belongs to an account
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    id: CalendarId,
    account_id: AccountId,
    name: String,
    /// Colour, normalized as a `#rrggbb` string
    color: Option<String>,
    /// The calendar collection on the server, for networked calendars
    remote_url: Option<Url>,
    privileges: Capabilities,
}

impl Calendar {
    /// Create a new calendar. It grants every privilege until told otherwise.
    pub fn new(id: CalendarId, account_id: AccountId, name: String) -> Self {
        Self {
            id, account_id, name,
            color: None,
            remote_url: None,
            privileges: Capabilities::all(),
        }
    }

    pub fn id(&self) -> &CalendarId { &self.id }
    pub fn account_id(&self) -> &AccountId { &self.account_id }
    pub fn name(&self) -> &str { &self.name }
    pub fn color(&self) -> Option<&str> { self.color.as_deref() }
    pub fn remote_url(&self) -> Option<&Url> { self.remote_url.as_ref() }
    pub fn privileges(&self) -> Capabilities { self.privileges }

    /// Set the colour from any CSS colour string (`"red"`, `"#0f0"`, `"rgb(0, 0, 255)"`...)
    pub fn set_color(&mut self, css_color: &str) -> Result<(), DynError> {
        let color = csscolorparser::parse(css_color)?;
        self.color = Some(color.to_hex_string());
        Ok(())
    }

    pub fn set_remote_url(&mut self, url: Option<Url>) {
        self.remote_url = url;
    }

    pub fn set_privileges(&mut self, privileges: Capabilities) {
        self.privileges = privileges;
    }

    pub fn set_account_id(&mut self, account_id: AccountId) {
        self.account_id = account_id;
    }
}
