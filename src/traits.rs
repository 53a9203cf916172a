//! The seams between the router, its adapters and the remote service

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::account::Account;
use crate::calendar::{Calendar, Capabilities};
use crate::error::{DynError, ProviderError};
use crate::event::{Busytime, Event};
use crate::id::CalendarId;
use crate::provider::request::Request;

/// The operations a calendar provider supports.
///
/// The router picks one implementation per call, and forwards the routed [`Request`] along with the arguments of the operation.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Returns the complete account that `request.account` describes
    async fn get_account(&self, request: Request) -> Result<Account, ProviderError>;

    /// Returns the calendars of `request.account`
    async fn find_calendars(&self, request: Request) -> Result<HashMap<CalendarId, Calendar>, ProviderError>;

    /// Brings the events of `request.calendar` up to date
    async fn sync_events(&self, request: Request) -> Result<(), ProviderError>;

    /// Makes sure every occurrence of recurring events is known until `max_date`
    async fn ensure_recurrences_expanded(&self, request: Request, max_date: DateTime<Utc>) -> Result<(), ProviderError>;

    /// Stores a new event. Returns it, as it has been stored
    async fn create_event(&self, request: Request, event: Event, busytime: Option<Busytime>) -> Result<Event, ProviderError>;

    async fn update_event(&self, request: Request, event: Event, busytime: Option<Busytime>) -> Result<Event, ProviderError>;

    async fn delete_event(&self, request: Request, event: Event, busytime: Option<Busytime>) -> Result<(), ProviderError>;

    /// Returns the iCal representation of an event
    async fn create_ical_component_for_event(&self, request: Request, event: Event) -> Result<String, ProviderError>;

    async fn calendar_capabilities(&self, request: Request, calendar: Calendar) -> Result<Capabilities, ProviderError>;

    async fn event_capabilities(&self, request: Request, event: Event) -> Result<Capabilities, ProviderError>;
}

#[async_trait]
impl<T> CalendarProvider for Arc<T>
where
    T: CalendarProvider + ?Sized,
{
    async fn get_account(&self, request: Request) -> Result<Account, ProviderError> {
        (**self).get_account(request).await
    }
    async fn find_calendars(&self, request: Request) -> Result<HashMap<CalendarId, Calendar>, ProviderError> {
        (**self).find_calendars(request).await
    }
    async fn sync_events(&self, request: Request) -> Result<(), ProviderError> {
        (**self).sync_events(request).await
    }
    async fn ensure_recurrences_expanded(&self, request: Request, max_date: DateTime<Utc>) -> Result<(), ProviderError> {
        (**self).ensure_recurrences_expanded(request, max_date).await
    }
    async fn create_event(&self, request: Request, event: Event, busytime: Option<Busytime>) -> Result<Event, ProviderError> {
        (**self).create_event(request, event, busytime).await
    }
    async fn update_event(&self, request: Request, event: Event, busytime: Option<Busytime>) -> Result<Event, ProviderError> {
        (**self).update_event(request, event, busytime).await
    }
    async fn delete_event(&self, request: Request, event: Event, busytime: Option<Busytime>) -> Result<(), ProviderError> {
        (**self).delete_event(request, event, busytime).await
    }
    async fn create_ical_component_for_event(&self, request: Request, event: Event) -> Result<String, ProviderError> {
        (**self).create_ical_component_for_event(request, event).await
    }
    async fn calendar_capabilities(&self, request: Request, calendar: Calendar) -> Result<Capabilities, ProviderError> {
        (**self).calendar_capabilities(request, calendar).await
    }
    async fn event_capabilities(&self, request: Request, event: Event) -> Result<Capabilities, ProviderError> {
        (**self).event_capabilities(request, event).await
    }
}

/// A provider that serves on-device data, and can tell which accounts it is responsible for
pub trait LocalSource: CalendarProvider {
    fn is_local(&self, account: &Account) -> bool;
}

/// A CalDAV server, as seen from the worker
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Whether the service is ready to handle requests
    async fn is_ready(&self) -> bool {
        true
    }

    /// Checks the credentials of an account and returns it, completed with what the server told
    async fn get_account(&self, account: &Account) -> Result<Account, DynError>;

    async fn find_calendars(&self, account: &Account) -> Result<Vec<Calendar>, DynError>;

    /// Returns every event of a calendar
    async fn list_events(&self, account: &Account, calendar: &Calendar) -> Result<Vec<Event>, DynError>;

    /// Uploads a new event. Returns it as the server stored it (with its version tag)
    async fn create_event(&self, account: &Account, calendar: &Calendar, event: &Event) -> Result<Event, DynError>;

    async fn update_event(&self, account: &Account, calendar: &Calendar, event: &Event) -> Result<Event, DynError>;

    async fn delete_event(&self, account: &Account, calendar: &Calendar, event: &Event) -> Result<(), DynError>;
}
