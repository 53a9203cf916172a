//! Calendar events and their occurrences ("busytimes")

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Months, Utc};
use uuid::Uuid;

use crate::config::MAX_OCCURRENCES_PER_EVENT;
use crate::id::{BusytimeId, CalendarId, EventId};

/// How often a recurring event repeats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// The start of the `n`-th occurrence of a series that starts at `start`
    fn nth_after(&self, start: DateTime<Utc>, n: u32) -> Option<DateTime<Utc>> {
        match self {
            Frequency::Daily => start.checked_add_signed(Duration::days(i64::from(n))),
            Frequency::Weekly => start.checked_add_signed(Duration::weeks(i64::from(n))),
            Frequency::Monthly => start.checked_add_months(Months::new(n)),
            Frequency::Yearly => start.checked_add_months(Months::new(n.checked_mul(12)?)),
        }
    }

    /// The value of the `FREQ` part of an iCal `RRULE`
    pub fn ical_name(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

/// The user-visible part of an event, as it is stored on the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    /// Persistent, globally unique identifier (iCal `UID`)
    pub uid: String,
    pub title: String,
    pub location: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Minutes before the start of each occurrence at which an alarm fires
    pub alarms: Vec<i64>,
    pub freq: Option<Frequency>,
    pub until: Option<DateTime<Utc>>,
    /// The last time this event was modified
    pub last_modified: DateTime<Utc>,
    /// The server version tag, for events that come from a server
    pub etag: Option<String>,
}

impl EventData {
    pub fn new(title: String, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            uid: Uuid::new_v4().to_hyphenated().to_string(),
            title,
            location: String::new(),
            description: String::new(),
            start,
            end,
            alarms: Vec::new(),
            freq: None,
            until: None,
            last_modified: Utc::now(),
            etag: None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.freq.is_some()
    }
}

/// An event, stored in a calendar
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// `None` until the event has been stored for the first time
    id: Option<EventId>,
    calendar_id: CalendarId,
    pub remote: EventData,
}

impl Event {
    pub fn new(calendar_id: CalendarId, remote: EventData) -> Self {
        Self { id: None, calendar_id, remote }
    }

    pub fn id(&self) -> Option<&EventId> { self.id.as_ref() }
    pub fn calendar_id(&self) -> &CalendarId { &self.calendar_id }

    /// Returns the id of this event, picking a new (random) one if it has none yet
    pub fn ensure_id(&mut self) -> &EventId {
        self.id.get_or_insert_with(EventId::random)
    }

    pub fn set_id(&mut self, id: EventId) {
        self.id = Some(id);
    }

    /// Every occurrence of this event that starts before (or at) `max_date`.
    ///
    /// A non-recurring event has exactly one occurrence, regardless of `max_date`.
    /// A recurring event yields at most [`MAX_OCCURRENCES_PER_EVENT`] occurrences, and none past the representable dates.
    /// Events without an id have no occurrences.
    pub fn occurrences_until(&self, max_date: DateTime<Utc>) -> Vec<Busytime> {
        let event_id = match &self.id {
            None => return Vec::new(),
            Some(id) => id,
        };

        let first = Busytime::new(event_id, &self.calendar_id, self.remote.start, self.remote.end);
        let freq = match self.remote.freq {
            None => return vec![first],
            Some(freq) => freq,
        };

        let limit = match self.remote.until {
            Some(until) if until < max_date => until,
            _ => max_date,
        };
        let length = self.remote.end - self.remote.start;

        let mut busytimes = vec![first];
        let mut n = 1;
        while let Some(start) = freq.nth_after(self.remote.start, n) {
            if start > limit {
                break;
            }
            if busytimes.len() >= MAX_OCCURRENCES_PER_EVENT {
                log::warn!("Event {} has more than {} occurrences until {}. Ignoring the next ones", event_id, MAX_OCCURRENCES_PER_EVENT, max_date);
                break;
            }
            let end = match start.checked_add_signed(length) {
                None => break,
                Some(end) => end,
            };
            busytimes.push(Busytime::new(event_id, &self.calendar_id, start, end));
            n += 1;
        }
        busytimes
    }
}

/// A single occurrence of an event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Busytime {
    id: BusytimeId,
    event_id: EventId,
    calendar_id: CalendarId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Busytime {
    /// Occurrences are identified by their event and start time, so that expanding twice yields the same busytimes
    pub fn new(event_id: &EventId, calendar_id: &CalendarId, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: BusytimeId::from(format!("{}-{}", event_id, start.timestamp())),
            event_id: event_id.clone(),
            calendar_id: calendar_id.clone(),
            start,
            end,
        }
    }

    pub fn id(&self) -> &BusytimeId { &self.id }
    pub fn event_id(&self) -> &EventId { &self.event_id }
    pub fn calendar_id(&self) -> &CalendarId { &self.calendar_id }
    pub fn start(&self) -> DateTime<Utc> { self.start }
    pub fn end(&self) -> DateTime<Utc> { self.end }

    /// Whether this occurrence overlaps `[start, end]`
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start <= end && self.end >= start
    }
}
