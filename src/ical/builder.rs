//! A module to build ICal files

use chrono::{DateTime, Utc};
use ics::properties::{Description, DtEnd, DtStart, LastModified, Location, RRule, Summary};
use ics::ICalendar;

use crate::error::DynError;
use crate::event::Event;
use super::default_prod_id;

/// Create an iCal file that contains a `VEVENT` for this event
pub fn build_from(event: &Event) -> Result<String, DynError> {
    let data = &event.remote;
    if data.end < data.start {
        return Err(format!("Event {} ends before it starts", data.uid).into());
    }

    let s_last_modified = format_date_time(&data.last_modified);

    let mut vevent = ics::Event::new(data.uid.clone(), s_last_modified.clone());
    vevent.push(LastModified::new(s_last_modified));
    vevent.push(Summary::new(ics::escape_text(data.title.clone())));
    if data.location.is_empty() == false {
        vevent.push(Location::new(ics::escape_text(data.location.clone())));
    }
    if data.description.is_empty() == false {
        vevent.push(Description::new(ics::escape_text(data.description.clone())));
    }
    vevent.push(DtStart::new(format_date_time(&data.start)));
    vevent.push(DtEnd::new(format_date_time(&data.end)));

    if let Some(freq) = data.freq {
        let rule = match data.until {
            None => format!("FREQ={}", freq.ical_name()),
            Some(until) => format!("FREQ={};UNTIL={}", freq.ical_name(), format_date_time(&until)),
        };
        vevent.push(RRule::new(rule));
    }

    let mut calendar = ICalendar::new("2.0", default_prod_id());
    calendar.add_event(vevent);

    Ok(calendar.to_string())
}

fn format_date_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}
