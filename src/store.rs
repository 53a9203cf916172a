//! This module provides the on-device stores for accounts, calendars, events and busytimes

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::account::Account;
use crate::calendar::Calendar;
use crate::error::{DynError, ProviderError};
use crate::event::{Busytime, Event};
use crate::id::{AccountId, BusytimeId, CalendarId, EventId};
use crate::provider::request::Owners;

/// The on-device database.
///
/// Every store lives in memory, and can be saved to (and loaded from) a JSON backing file.
#[derive(Debug)]
pub struct Db {
    backing_file: Option<PathBuf>,
    data: Mutex<DbData>,
}

#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
struct DbData {
    accounts: HashMap<AccountId, Account>,
    calendars: HashMap<CalendarId, Calendar>,
    events: HashMap<EventId, Event>,
    busytimes: HashMap<BusytimeId, Busytime>,
    /// Recurring events have been expanded into busytimes up to this date
    expanded_until: Option<DateTime<Utc>>,
}

impl Db {
    /// Create an empty database that is not backed by any file
    pub fn in_memory() -> Self {
        Self { backing_file: None, data: Mutex::new(DbData::default()) }
    }

    /// Create an empty database, that will be saved to `path`
    pub fn new(path: &Path) -> Self {
        Self { backing_file: Some(PathBuf::from(path)), data: Mutex::new(DbData::default()) }
    }

    /// Initialize a database from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(path: &Path) -> Result<Self, DynError> {
        let data: DbData = match std::fs::File::open(path) {
            Err(err) => {
                return Err(format!("Unable to open file {:?}: {}", path, err).into());
            },
            Ok(file) => serde_json::from_reader(file)?,
        };

        Ok(Self {
            backing_file: Some(PathBuf::from(path)),
            data: Mutex::new(data),
        })
    }

    /// Store the current content to the backing file
    pub fn save_to_file(&self) -> Result<(), DynError> {
        let path = match &self.backing_file {
            None => return Err("This database has no backing file".into()),
            Some(path) => path,
        };
        let file = std::fs::File::create(path)?;
        let data = self.lock().clone();
        serde_json::to_writer(file, &data)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, DbData> {
        match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("The database lock was poisoned. Using its current content anyway");
                poisoned.into_inner()
            },
        }
    }

    /// Compares two databases to check they have the same current content
    pub fn has_same_contents_than(&self, other: &Self) -> bool {
        let left = self.lock().clone();
        let right = other.lock().clone();
        left == right
    }


    pub fn add_account(&self, account: Account) {
        self.lock().accounts.insert(account.id().clone(), account);
    }

    pub fn account(&self, id: &AccountId) -> Option<Account> {
        self.lock().accounts.get(id).cloned()
    }

    pub fn account_by_preset(&self, preset: &str) -> Option<Account> {
        self.lock().accounts.values()
            .find(|account| account.preset() == preset)
            .cloned()
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.lock().accounts.values().cloned().collect()
    }


    pub fn add_calendar(&self, calendar: Calendar) {
        self.lock().calendars.insert(calendar.id().clone(), calendar);
    }

    pub fn calendar(&self, id: &CalendarId) -> Option<Calendar> {
        self.lock().calendars.get(id).cloned()
    }

    pub fn calendars_for_account(&self, account_id: &AccountId) -> HashMap<CalendarId, Calendar> {
        self.lock().calendars.iter()
            .filter(|(_, cal)| cal.account_id() == account_id)
            .map(|(id, cal)| (id.clone(), cal.clone()))
            .collect()
    }


    /// Insert (or replace) an event, and replace its busytimes with `busytimes`
    pub fn put_event(&self, event: Event, busytimes: Vec<Busytime>) -> Result<(), DynError> {
        let event_id = match event.id() {
            None => return Err("Cannot store an event that has no id".into()),
            Some(id) => id.clone(),
        };

        let mut data = self.lock();
        data.busytimes.retain(|_, b| b.event_id() != &event_id);
        for busytime in busytimes {
            data.busytimes.insert(busytime.id().clone(), busytime);
        }
        data.events.insert(event_id, event);
        Ok(())
    }

    /// Remove an event and all its busytimes. Returns the removed event, if it existed
    pub fn remove_event(&self, id: &EventId) -> Option<Event> {
        let mut data = self.lock();
        data.busytimes.retain(|_, b| b.event_id() != id);
        data.events.remove(id)
    }

    pub fn event(&self, id: &EventId) -> Option<Event> {
        self.lock().events.get(id).cloned()
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().events.values().cloned().collect()
    }

    pub fn events_for_calendar(&self, calendar_id: &CalendarId) -> Vec<Event> {
        self.lock().events.values()
            .filter(|event| event.calendar_id() == calendar_id)
            .cloned()
            .collect()
    }

    /// Every busytime that overlaps `[start, end]`, sorted by start date
    pub fn load_span(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Busytime> {
        let mut busytimes: Vec<Busytime> = self.lock().busytimes.values()
            .filter(|b| b.overlaps(start, end))
            .cloned()
            .collect();
        busytimes.sort_by_key(|b| b.start());
        busytimes
    }

    pub fn add_busytimes(&self, busytimes: Vec<Busytime>) {
        let mut data = self.lock();
        for busytime in busytimes {
            data.busytimes.insert(busytime.id().clone(), busytime);
        }
    }

    pub fn expanded_until(&self) -> Option<DateTime<Utc>> {
        self.lock().expanded_until
    }

    pub fn set_expanded_until(&self, date: DateTime<Utc>) {
        self.lock().expanded_until = Some(date);
    }


    /// Resolve the account and calendar an event belongs to
    pub async fn owners_of_event(&self, event: &Event) -> Result<Owners, ProviderError> {
        self.owners_of_calendar_id(event.calendar_id())
    }

    /// Resolve the account (and the calendar itself, as stored) a calendar belongs to
    pub async fn owners_of_calendar(&self, calendar: &Calendar) -> Result<Owners, ProviderError> {
        self.owners_of_calendar_id(calendar.id())
    }

    fn owners_of_calendar_id(&self, calendar_id: &CalendarId) -> Result<Owners, ProviderError> {
        let data = self.lock();
        let calendar = data.calendars.get(calendar_id)
            .ok_or_else(|| ProviderError::OwnerNotFound(format!("calendar {}", calendar_id)))?;
        let account = data.accounts.get(calendar.account_id())
            .ok_or_else(|| ProviderError::OwnerNotFound(format!("account {}", calendar.account_id())))?;

        Ok(Owners {
            account: account.clone(),
            calendar: calendar.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use crate::event::EventData;

    fn populated_db(path: &Path) -> (Db, Event) {
        let db = Db::new(path);
        let account = Account::from_preset("local");
        let calendar = Calendar::new("local-first".into(), account.id().clone(), "Offline calendar".to_string());
        db.add_account(account);
        db.add_calendar(calendar);

        let start = Utc::now();
        let mut event = Event::new("local-first".into(), EventData::new("Boomsday".to_string(), start, start + Duration::hours(2)));
        event.ensure_id();
        let busytimes = event.occurrences_until(start);
        db.put_event(event.clone(), busytimes).unwrap();
        (db, event)
    }

    #[test]
    fn serde_db() {
        let path = std::env::temp_dir().join(format!("calendar-router-{}.json", uuid::Uuid::new_v4()));
        let (db, _) = populated_db(&path);
        db.save_to_file().unwrap();

        let retrieved = Db::from_file(&path).unwrap();
        assert!(db.has_same_contents_than(&retrieved));
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn owners_of_an_event() {
        let (db, event) = populated_db(Path::new("unused.json"));
        let owners = db.owners_of_event(&event).await.unwrap();
        assert_eq!(owners.calendar.id().as_str(), "local-first");
        assert_eq!(owners.account.preset(), "local");

        let orphan = Event::new("nowhere".into(), event.remote.clone());
        let err = db.owners_of_event(&orphan).await.unwrap_err();
        assert_eq!(err.name(), "owner-not-found");
    }

    #[test]
    fn removing_an_event_removes_its_busytimes() {
        let (db, event) = populated_db(Path::new("unused.json"));
        let span = (event.remote.start - Duration::days(1), event.remote.end + Duration::days(1));
        assert_eq!(db.load_span(span.0, span.1).len(), 1);

        assert!(db.remove_event(event.id().unwrap()).is_some());
        assert!(db.load_span(span.0, span.1).is_empty());
        assert!(db.events_for_calendar(&"local-first".into()).is_empty());
    }
}
