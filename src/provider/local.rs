//! The provider that serves on-device calendars
//!
//! Like the worker, it saves the accounts and calendars it discovers into the on-device stores.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::account::{Account, ProviderType};
use crate::calendar::{Calendar, Capabilities};
use crate::config::{LOCAL_CALENDAR_ID, LOCAL_CALENDAR_NAME_KEY};
use crate::error::ProviderError;
use crate::event::{Busytime, Event};
use crate::id::CalendarId;
use crate::l10n::Localizer;
use crate::store::Db;
use crate::traits::{CalendarProvider, LocalSource};
use super::request::Request;

/// Executes operations against the on-device stores
pub struct Local {
    db: Arc<Db>,
    l10n: Arc<dyn Localizer>,
}

impl Local {
    pub fn new(db: Arc<Db>, l10n: Arc<dyn Localizer>) -> Self {
        Self { db, l10n }
    }

    pub fn db(&self) -> &Arc<Db> {
        &self.db
    }

    /// Stores an event, along with its occurrences up to what has already been expanded
    pub(crate) fn store_event(&self, mut event: Event) -> Result<Event, ProviderError> {
        event.ensure_id();
        let busytimes = event.occurrences_until(self.expansion_limit());
        self.db.put_event(event.clone(), busytimes).map_err(ProviderError::Store)?;
        Ok(event)
    }

    /// Replaces every event of a calendar by `events`
    pub(crate) fn replace_calendar_events(&self, calendar_id: &CalendarId, events: Vec<Event>) -> Result<(), ProviderError> {
        for stale in self.db.events_for_calendar(calendar_id) {
            if let Some(id) = stale.id() {
                self.db.remove_event(id);
            }
        }
        for event in events {
            self.store_event(event)?;
        }
        Ok(())
    }

    fn expansion_limit(&self) -> DateTime<Utc> {
        self.db.expanded_until().unwrap_or_else(Utc::now)
    }
}

#[async_trait]
impl CalendarProvider for Local {
    async fn get_account(&self, request: Request) -> Result<Account, ProviderError> {
        let mut account = request.account
            .ok_or_else(|| ProviderError::Unexpected(String::from("getAccount without any account")))?;

        if let Some(known) = self.db.account_by_preset(account.preset()) {
            account.set_id(known.id().clone());
        }
        account.set_provider_type(ProviderType::Local);
        self.db.add_account(account.clone());
        Ok(account)
    }

    async fn find_calendars(&self, request: Request) -> Result<HashMap<CalendarId, Calendar>, ProviderError> {
        let account = request.account
            .ok_or_else(|| ProviderError::Unexpected(String::from("findCalendars without any account")))?;

        let id = CalendarId::from(LOCAL_CALENDAR_ID);
        let calendar = match self.db.calendar(&id) {
            Some(calendar) => calendar,
            None => Calendar::new(id.clone(), account.id().clone(), self.l10n.get(LOCAL_CALENDAR_NAME_KEY)),
        };

        self.db.add_calendar(calendar.clone());
        let mut calendars = HashMap::new();
        calendars.insert(id, calendar);
        Ok(calendars)
    }

    async fn sync_events(&self, _request: Request) -> Result<(), ProviderError> {
        // On-device calendars are their own source of truth
        Ok(())
    }

    async fn ensure_recurrences_expanded(&self, _request: Request, max_date: DateTime<Utc>) -> Result<(), ProviderError> {
        if let Some(expanded) = self.db.expanded_until() {
            if expanded >= max_date {
                log::trace!("Recurrences are already expanded until {}", expanded);
                return Ok(());
            }
        }

        let mut count = 0;
        for event in self.db.events().into_iter().filter(|e| e.remote.is_recurring()) {
            let busytimes = event.occurrences_until(max_date);
            count += busytimes.len();
            self.db.add_busytimes(busytimes);
        }
        self.db.set_expanded_until(max_date);
        log::debug!("Expanded recurring events until {} ({} busytimes)", max_date, count);
        Ok(())
    }

    async fn create_event(&self, _request: Request, event: Event, _busytime: Option<Busytime>) -> Result<Event, ProviderError> {
        self.store_event(event)
    }

    async fn update_event(&self, _request: Request, event: Event, _busytime: Option<Busytime>) -> Result<Event, ProviderError> {
        if event.id().is_none() {
            return Err(ProviderError::Unexpected(String::from("updateEvent on an event that was never stored")));
        }
        self.store_event(event)
    }

    async fn delete_event(&self, _request: Request, event: Event, _busytime: Option<Busytime>) -> Result<(), ProviderError> {
        match event.id() {
            None => Err(ProviderError::Unexpected(String::from("deleteEvent on an event that was never stored"))),
            Some(id) => {
                if self.db.remove_event(id).is_none() {
                    log::warn!("Event {} was already deleted", id);
                }
                Ok(())
            },
        }
    }

    async fn create_ical_component_for_event(&self, _request: Request, event: Event) -> Result<String, ProviderError> {
        crate::ical::build_from(&event).map_err(ProviderError::Store)
    }

    async fn calendar_capabilities(&self, _request: Request, _calendar: Calendar) -> Result<Capabilities, ProviderError> {
        Ok(Capabilities::all())
    }

    async fn event_capabilities(&self, _request: Request, _event: Event) -> Result<Capabilities, ProviderError> {
        Ok(Capabilities::all())
    }
}

impl LocalSource for Local {
    fn is_local(&self, account: &Account) -> bool {
        account.provider_type() == ProviderType::Local
    }
}
