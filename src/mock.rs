//! An in-memory CalDAV server, that can be used in place of a real one in tests and demos
#![cfg(feature = "mock_remote_service")]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::account::Account;
use crate::calendar::Calendar;
use crate::error::DynError;
use crate::event::Event;
use crate::id::{CalendarId, EventId};
use crate::mock_behaviour::MockBehaviour;
use crate::traits::RemoteService;

#[derive(Default, Debug)]
struct ServerData {
    /// user -> password
    users: HashMap<String, String>,
    calendars: HashMap<CalendarId, Calendar>,
    events: HashMap<CalendarId, HashMap<EventId, Event>>,
    behaviour: MockBehaviour,
    /// How many requests reached this server
    hits: u32,
}

/// A mocked server. Clones share the same data.
#[derive(Clone, Debug, Default)]
pub struct MockServer {
    data: Arc<Mutex<ServerData>>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ServerData> {
        match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn add_user(&self, user: &str, password: &str) {
        self.lock().users.insert(user.to_string(), password.to_string());
    }

    pub fn add_calendar(&self, calendar: Calendar) {
        let mut data = self.lock();
        data.events.entry(calendar.id().clone()).or_default();
        data.calendars.insert(calendar.id().clone(), calendar);
    }

    /// Adds an event directly on the server, as if another client had created it
    pub fn add_event(&self, mut event: Event) {
        event.ensure_id();
        event.remote.etag = Some(new_etag());
        let event_id = event.id().cloned().unwrap_or_else(EventId::random);
        self.lock().events
            .entry(event.calendar_id().clone())
            .or_default()
            .insert(event_id, event);
    }

    pub fn events(&self, calendar_id: &CalendarId) -> Vec<Event> {
        self.lock().events.get(calendar_id)
            .map(|events| events.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn set_behaviour(&self, behaviour: MockBehaviour) {
        self.lock().behaviour = behaviour;
    }

    /// How many requests reached this server so far
    pub fn hits(&self) -> u32 {
        self.lock().hits
    }

    fn check_credentials(data: &ServerData, account: &Account) -> Result<(), DynError> {
        let user = account.user().unwrap_or_default();
        match data.users.get(user) {
            Some(password) if Some(password.as_str()) == account.password() => Ok(()),
            _ => Err(format!("Unauthorized user {:?}", user).into()),
        }
    }

    fn check_calendar(data: &ServerData, calendar: &Calendar) -> Result<(), DynError> {
        if data.calendars.contains_key(calendar.id()) {
            Ok(())
        } else {
            Err(format!("No such calendar on the server: {}", calendar.id()).into())
        }
    }
}

fn new_etag() -> String {
    Uuid::new_v4().to_hyphenated().to_string()
}

#[async_trait]
impl RemoteService for MockServer {
    async fn is_ready(&self) -> bool {
        self.lock().behaviour.is_ready()
    }

    async fn get_account(&self, account: &Account) -> Result<Account, DynError> {
        let mut data = self.lock();
        data.hits += 1;
        data.behaviour.can_get_account()?;
        Self::check_credentials(&data, account)?;

        let mut account = account.clone();
        if let Some(url) = account.server_url() {
            let home = url.join("calendars/")?;
            account.set_calendar_home(Some(home));
        }
        Ok(account)
    }

    async fn find_calendars(&self, account: &Account) -> Result<Vec<Calendar>, DynError> {
        let mut data = self.lock();
        data.hits += 1;
        data.behaviour.can_find_calendars()?;
        Self::check_credentials(&data, account)?;
        Ok(data.calendars.values().cloned().collect())
    }

    async fn list_events(&self, account: &Account, calendar: &Calendar) -> Result<Vec<Event>, DynError> {
        let mut data = self.lock();
        data.hits += 1;
        data.behaviour.can_list_events()?;
        Self::check_credentials(&data, account)?;
        Self::check_calendar(&data, calendar)?;
        Ok(data.events.get(calendar.id())
            .map(|events| events.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn create_event(&self, account: &Account, calendar: &Calendar, event: &Event) -> Result<Event, DynError> {
        let mut data = self.lock();
        data.hits += 1;
        data.behaviour.can_create_event()?;
        Self::check_credentials(&data, account)?;
        Self::check_calendar(&data, calendar)?;

        let mut stored = event.clone();
        let id = stored.ensure_id().clone();
        stored.remote.etag = Some(new_etag());
        let events = data.events.entry(calendar.id().clone()).or_default();
        if events.contains_key(&id) {
            return Err(format!("Event {} already exists on the server", id).into());
        }
        events.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_event(&self, account: &Account, calendar: &Calendar, event: &Event) -> Result<Event, DynError> {
        let mut data = self.lock();
        data.hits += 1;
        data.behaviour.can_update_event()?;
        Self::check_credentials(&data, account)?;
        Self::check_calendar(&data, calendar)?;

        let id = event.id().cloned().ok_or("Cannot update an event that has no id")?;
        let events = data.events.entry(calendar.id().clone()).or_default();
        let previous = events.get(&id).ok_or_else(|| format!("No such event on the server: {}", id))?;
        if previous.remote.etag != event.remote.etag {
            return Err(format!("Event {} has been modified on the server in the meantime", id).into());
        }

        let mut stored = event.clone();
        stored.remote.etag = Some(new_etag());
        events.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_event(&self, account: &Account, calendar: &Calendar, event: &Event) -> Result<(), DynError> {
        let mut data = self.lock();
        data.hits += 1;
        data.behaviour.can_delete_event()?;
        Self::check_credentials(&data, account)?;
        Self::check_calendar(&data, calendar)?;

        let id = event.id().ok_or("Cannot delete an event that has no id")?;
        match data.events.get_mut(calendar.id()).and_then(|events| events.remove(id)) {
            None => Err(format!("No such event on the server: {}", id).into()),
            Some(_) => Ok(()),
        }
    }
}
