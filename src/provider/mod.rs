//! This modules routes calendar operations to the right data source
//!
//! Operations on on-device calendars are served by a local provider, while operations on networked calendars are forwarded to a worker that talks to the server.
//! Networked operations are refused when the device is offline.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;

use crate::account::Account;
use crate::app::App;
use crate::calendar::{Calendar, Capabilities};
use crate::config::OFFLINE_MESSAGE_KEY;
use crate::error::ProviderError;
use crate::event::{Busytime, Event};
use crate::id::CalendarId;
use crate::traits::{CalendarProvider, LocalSource};

pub mod local;
pub mod request;
pub mod worker;

use local::Local;
use request::{Method, Request, Target};
use worker::Worker;

/// The usual router, between the on-device stores and a CalDAV worker
pub type DeviceProvider = Provider<Local, Worker>;

/// Routes every request either to the `local` provider, or to the `remote` one.
///
/// A provider must be given its application context (see [`Provider::set_app`]) before it accepts any request.
pub struct Provider<L, R>
where
    L: LocalSource,
    R: CalendarProvider,
{
    app: OnceCell<Arc<App>>,
    /// The on-device provider
    local: Arc<L>,
    /// The provider that reaches the server (usually a [`Worker`])
    remote: R,
}

impl<L, R> Provider<L, R>
where
    L: LocalSource,
    R: CalendarProvider,
{
    /// Create a provider that has no application context yet
    pub fn new(local: Arc<L>, remote: R) -> Self {
        Self { app: OnceCell::new(), local, remote }
    }

    /// Create a provider that is ready to accept requests
    pub fn with_app(app: Arc<App>, local: Arc<L>, remote: R) -> Self {
        let provider = Self::new(local, remote);
        let _ = provider.app.set(app);
        provider
    }

    /// Set the application context. This can be done only once.
    pub fn set_app(&self, app: Arc<App>) -> Result<(), ProviderError> {
        self.app.set(app).map_err(|_| ProviderError::AlreadyInitialized)
    }

    pub fn app(&self) -> Option<&Arc<App>> {
        self.app.get()
    }

    pub fn local(&self) -> &Arc<L> { &self.local }
    pub fn remote(&self) -> &R { &self.remote }

    /// Whether this account is served by the local provider
    pub fn is_local(&self, account: &Account) -> bool {
        self.local.is_local(account)
    }


    pub async fn get_account(&self, account: Account) -> Result<Account, ProviderError> {
        let (provider, request) = self.route(Method::GetAccount, Target::ByAccount { account: Some(account), calendar: None })?;
        provider.get_account(request).await
    }

    pub async fn find_calendars(&self, account: Account) -> Result<HashMap<CalendarId, Calendar>, ProviderError> {
        let (provider, request) = self.route(Method::FindCalendars, Target::ByAccount { account: Some(account), calendar: None })?;
        provider.find_calendars(request).await
    }

    pub async fn sync_events(&self, account: Account, calendar: Calendar) -> Result<(), ProviderError> {
        let (provider, request) = self.route(Method::SyncEvents, Target::ByAccount { account: Some(account), calendar: Some(calendar) })?;
        provider.sync_events(request).await
    }

    pub async fn ensure_recurrences_expanded(&self, max_date: DateTime<Utc>) -> Result<(), ProviderError> {
        let (provider, request) = self.route(Method::EnsureRecurrencesExpanded, Target::ByAccount { account: None, calendar: None })?;
        provider.ensure_recurrences_expanded(request, max_date).await
    }

    pub async fn create_event(&self, event: Event, busytime: Option<Busytime>) -> Result<Event, ProviderError> {
        let owners = self.ensure_ready()?.db().owners_of_event(&event).await?;
        let (provider, request) = self.route(Method::CreateEvent, Target::ByOwners(owners))?;
        provider.create_event(request, event, busytime).await
    }

    pub async fn update_event(&self, event: Event, busytime: Option<Busytime>) -> Result<Event, ProviderError> {
        let owners = self.ensure_ready()?.db().owners_of_event(&event).await?;
        let (provider, request) = self.route(Method::UpdateEvent, Target::ByOwners(owners))?;
        provider.update_event(request, event, busytime).await
    }

    pub async fn delete_event(&self, event: Event, busytime: Option<Busytime>) -> Result<(), ProviderError> {
        let owners = self.ensure_ready()?.db().owners_of_event(&event).await?;
        let (provider, request) = self.route(Method::DeleteEvent, Target::ByOwners(owners))?;
        provider.delete_event(request, event, busytime).await
    }

    pub async fn create_ical_component_for_event(&self, event: Event) -> Result<String, ProviderError> {
        let owners = self.ensure_ready()?.db().owners_of_event(&event).await?;
        let (provider, request) = self.route(Method::CreateICalComponentForEvent, Target::ByOwners(owners))?;
        provider.create_ical_component_for_event(request, event).await
    }

    pub async fn calendar_capabilities(&self, calendar: Calendar) -> Result<Capabilities, ProviderError> {
        let owners = self.ensure_ready()?.db().owners_of_calendar(&calendar).await?;
        let (provider, request) = self.route(Method::CalendarCapabilities, Target::ByOwners(owners))?;
        provider.calendar_capabilities(request, calendar).await
    }

    pub async fn event_capabilities(&self, event: Event) -> Result<Capabilities, ProviderError> {
        let owners = self.ensure_ready()?.db().owners_of_event(&event).await?;
        let (provider, request) = self.route(Method::EventCapabilities, Target::ByOwners(owners))?;
        provider.event_capabilities(request, event).await
    }


    fn ensure_ready(&self) -> Result<&Arc<App>, ProviderError> {
        match self.app.get() {
            Some(app) => Ok(app),
            None => {
                log::debug!("Provider was not initialized!");
                Err(ProviderError::NotInitialized)
            },
        }
    }

    /// Decide which provider serves a request, and build the request it will receive
    fn route(&self, method: Method, target: Target) -> Result<(&dyn CalendarProvider, Request), ProviderError> {
        log::debug!("Received request for {}", method);
        let app = self.ensure_ready()?;

        let mut request = Request::new(method, target);
        let is_local = method.always_local()
            || request.account.as_ref().map(|account| self.local.is_local(account)).unwrap_or(false);
        log::debug!("Operation on {} calendar.", if is_local { "local" } else { "remote" });

        if is_local && method.is_local_method() {
            log::debug!("Route request to local provider.");
            return Ok((self.local.as_ref(), request));
        }

        if is_local == false && app.is_online() == false {
            log::debug!("Cannot fulfill requests for networked calendars when offline.");
            return Err(ProviderError::Offline {
                message: app.l10n().get(OFFLINE_MESSAGE_KEY),
            });
        }

        request.sync = is_local == false;
        log::debug!("Route request to worker provider.");
        Ok((&self.remote, request))
    }
}
