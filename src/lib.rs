//! This crate routes calendar operations to the data source that can serve them.
//!
//! Calendars either live on the device (the "local" provider) or on a CalDAV server. Operations on networked calendars are handed over to a background [`Worker`](provider::worker::Worker), that talks to the server through a [`RemoteService`](traits::RemoteService) and mirrors the results into the on-device [`Db`](store::Db).
//!
//! Both providers are hidden behind a [`Provider`](provider::Provider), that decides for every request which one serves it, and refuses networked operations when the device is offline.
//!
//! This crate also provides a [`HeaderCursor`](header_cursor::HeaderCursor), that tracks the message displayed by a mail reader and its neighbours, and a generic [`retry`](retry::retry) helper.

pub mod traits;
pub mod config;
pub mod error;
pub use error::ProviderError;

mod id;
pub use id::{AccountId, BusytimeId, CalendarId, EventId};
pub mod account;
pub use account::Account;
pub mod calendar;
pub use calendar::{Calendar, Capabilities};
pub mod event;
pub use event::{Busytime, Event, EventData};

pub mod store;
pub mod online;
pub mod l10n;
pub mod app;
pub use app::App;

pub mod provider;
pub use provider::{DeviceProvider, Provider};

pub mod ical;
pub mod retry;
pub mod header_cursor;

pub mod mock;
pub mod mock_behaviour;
pub mod utils;
