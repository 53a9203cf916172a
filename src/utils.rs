//! Some utility functions

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::calendar::Calendar;
use crate::id::CalendarId;
use crate::store::Db;

/// A debug utility that pretty-prints calendars, and the events they contain
pub fn print_calendar_list(db: &Db, cals: &HashMap<CalendarId, Calendar>) {
    for (id, cal) in cals {
        println!("CAL {} ({})", cal.name(), id);
        for event in db.events_for_calendar(id) {
            let recurring = if event.remote.is_recurring() { "↻" } else { " " };
            let synced = if event.remote.etag.is_some() { "=" } else { "." };
            println!("    {}{} {}\t{}", recurring, synced, event.remote.title, event.remote.start);
        }
    }
}

/// A debug utility that pretty-prints the occurrences of events between two dates
pub fn print_busytimes(db: &Db, start: DateTime<Utc>, end: DateTime<Utc>) {
    for busytime in db.load_span(start, end) {
        let title = db.event(busytime.event_id())
            .map(|event| event.remote.title)
            .unwrap_or_default();
        println!("    {} -> {}\t{}", busytime.start(), busytime.end(), title);
    }
}
