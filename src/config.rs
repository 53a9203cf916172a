//! Support for library configuration options

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;

/// Part of the ProdID string that describes the organization (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static ORG_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("My organization".to_string())));

/// Part of the ProdID string that describes the product name (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("CalendarRouter".to_string())));

/// The account preset that designates the on-device provider
pub const LOCAL_PRESET: &str = "local";

/// Identifier of the calendar every local account owns
pub const LOCAL_CALENDAR_ID: &str = "local-first";

/// l10n key of the name of the on-device calendar
pub const LOCAL_CALENDAR_NAME_KEY: &str = "calendar-local";

/// l10n key of the message carried by offline errors
pub const OFFLINE_MESSAGE_KEY: &str = "error-offline";

/// How long the worker waits between two readiness checks of its remote service
pub const WORKER_READY_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How many readiness checks a worker performs before rejecting a message, unless told otherwise (see `Worker::spawn_with`)
pub const WORKER_READY_ATTEMPTS: u32 = 500;

/// Recurring events are expanded into at most this many busytimes at once
pub const MAX_OCCURRENCES_PER_EVENT: usize = 5000;

/// How many requests may be queued for the worker before callers wait
pub const WORKER_CHANNEL_CAPACITY: usize = 32;

/// Strings used when the host does not provide its own catalogue
pub static DEFAULT_L10N: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut catalogue = HashMap::new();
    catalogue.insert(OFFLINE_MESSAGE_KEY, "You are offline. Connect to the Internet and try again.");
    catalogue.insert(LOCAL_CALENDAR_NAME_KEY, "Offline calendar");
    catalogue
});

pub(crate) fn org_name() -> String {
    match ORG_NAME.lock() {
        Ok(name) => name.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub(crate) fn product_name() -> String {
    match PRODUCT_NAME.lock() {
        Ok(name) => name.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
