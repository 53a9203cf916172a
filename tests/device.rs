//! Drives a real device stack: on-device stores, a worker, and a mocked CalDAV server

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use calendar_router::account::{Account, ProviderType};
use calendar_router::config::WORKER_READY_ATTEMPTS;
use calendar_router::calendar::{Calendar, Capabilities};
use calendar_router::event::{Event, EventData, Frequency};
use calendar_router::l10n::Catalog;
use calendar_router::mock::MockServer;
use calendar_router::mock_behaviour::MockBehaviour;
use calendar_router::online::Navigator;
use calendar_router::provider::local::Local;
use calendar_router::provider::worker::Worker;
use calendar_router::store::Db;
use calendar_router::{App, CalendarId, DeviceProvider};


struct Device {
    provider: DeviceProvider,
    db: Arc<Db>,
    server: MockServer,
    navigator: Arc<Navigator>,
    local_account: Account,
    local_calendar: Calendar,
    remote_account: Account,
    work_calendar: Calendar,
}

impl Device {
    async fn new() -> Self {
        Self::with_ready_attempts(WORKER_READY_ATTEMPTS).await
    }

    async fn with_ready_attempts(ready_attempts: u32) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let db = Arc::new(Db::in_memory());
        let l10n = Arc::new(Catalog::new());
        let navigator = Arc::new(Navigator::new(true));

        let server = MockServer::new();
        server.add_user("john", "secret");
        server.add_calendar(Calendar::new("work".into(), "somebody-else".into(), "Work".to_string()));

        let local = Arc::new(Local::new(db.clone(), l10n.clone()));
        let worker = Worker::spawn_with(local.clone(), server.clone(), ready_attempts);
        let app = Arc::new(App::new(db.clone(), Some(navigator.clone()), l10n));
        let provider = DeviceProvider::with_app(app, local, worker);

        // Both providers save what they discover
        let local_account = provider.get_account(Account::from_preset("local")).await.unwrap();
        let local_calendars = provider.find_calendars(local_account.clone()).await.unwrap();
        let local_calendar = local_calendars.values().next().unwrap().clone();

        let url = "https://caldav.example.com/".parse().unwrap();
        let remote_account = Account::new_remote("caldav", url, "john".to_string(), "secret".to_string());
        let remote_account = provider.get_account(remote_account).await.unwrap();
        let remote_calendars = provider.find_calendars(remote_account.clone()).await.unwrap();
        let work_calendar = remote_calendars.get(&CalendarId::from("work")).unwrap().clone();

        Self { provider, db, server, navigator, local_account, local_calendar, remote_account, work_calendar }
    }

    fn meeting_in(calendar: &Calendar, start: DateTime<Utc>) -> Event {
        Event::new(calendar.id().clone(), EventData::new("Meeting".to_string(), start, start + Duration::hours(1)))
    }
}


#[tokio::test]
async fn local_account_is_served_by_the_device() {
    let device = Device::new().await;

    assert_eq!(device.local_account.provider_type(), ProviderType::Local);
    assert_eq!(device.local_calendar.id().as_str(), "local-first");
    assert_eq!(device.local_calendar.name(), "Offline calendar");
    assert_eq!(device.local_calendar.account_id(), device.local_account.id());
    assert_eq!(device.db.account(device.local_account.id()), Some(device.local_account.clone()));
    assert_eq!(device.db.calendar(device.local_calendar.id()), Some(device.local_calendar.clone()));

    // Asking again gives back the same account
    let again = device.provider.get_account(Account::from_preset("local")).await.unwrap();
    assert_eq!(again.id(), device.local_account.id());
}

#[tokio::test]
async fn remote_calendars_are_mirrored_on_the_device() {
    let device = Device::new().await;

    assert_eq!(device.work_calendar.account_id(), device.remote_account.id());
    let stored = device.db.calendar(&CalendarId::from("work")).unwrap();
    assert_eq!(stored, device.work_calendar);

    assert_eq!(device.remote_account.calendar_home().unwrap().as_str(), "https://caldav.example.com/calendars/");
    assert_eq!(device.db.account(device.remote_account.id()), Some(device.remote_account.clone()));
}

#[tokio::test]
async fn local_events_never_reach_the_server() {
    let device = Device::new().await;
    let hits = device.server.hits();
    device.navigator.set_on_line(false);

    let event = Device::meeting_in(&device.local_calendar, Utc::now());
    let created = device.provider.create_event(event, None).await.unwrap();
    let id = created.id().unwrap().clone();
    assert!(device.db.event(&id).is_some());

    let mut renamed = created.clone();
    renamed.remote.title = "Renamed meeting".to_string();
    device.provider.update_event(renamed, None).await.unwrap();
    assert_eq!(device.db.event(&id).unwrap().remote.title, "Renamed meeting");

    let ical = device.provider.create_ical_component_for_event(created.clone()).await.unwrap();
    assert!(ical.contains("SUMMARY:Meeting"));

    device.provider.delete_event(created, None).await.unwrap();
    assert!(device.db.event(&id).is_none());

    assert_eq!(device.server.hits(), hits);
}

#[tokio::test]
async fn remote_events_go_through_the_server() {
    let device = Device::new().await;

    let event = Device::meeting_in(&device.work_calendar, Utc::now());
    let created = device.provider.create_event(event, None).await.unwrap();
    let id = created.id().unwrap().clone();
    assert!(created.remote.etag.is_some());
    assert_eq!(device.server.events(&CalendarId::from("work")).len(), 1);
    assert_eq!(device.db.event(&id).unwrap(), created);

    let mut moved = created.clone();
    moved.remote.location = "Room 101".to_string();
    let updated = device.provider.update_event(moved, None).await.unwrap();
    assert_ne!(updated.remote.etag, created.remote.etag);
    assert_eq!(device.server.events(&CalendarId::from("work"))[0].remote.location, "Room 101");
    assert_eq!(device.db.event(&id).unwrap().remote.location, "Room 101");

    device.provider.delete_event(updated, None).await.unwrap();
    assert!(device.server.events(&CalendarId::from("work")).is_empty());
    assert!(device.db.event(&id).is_none());
}

#[tokio::test]
async fn stale_updates_are_rejected_by_the_server() {
    let device = Device::new().await;

    let event = Device::meeting_in(&device.work_calendar, Utc::now());
    let created = device.provider.create_event(event, None).await.unwrap();
    let mut first = created.clone();
    first.remote.title = "First".to_string();
    device.provider.update_event(first, None).await.unwrap();

    let mut second = created;
    second.remote.title = "Second".to_string();
    let err = device.provider.update_event(second, None).await.unwrap_err();
    assert_eq!(err.name(), "remote");
}

#[tokio::test]
async fn remote_requests_fail_while_offline() {
    let device = Device::new().await;
    let hits = device.server.hits();
    device.navigator.set_on_line(false);

    let event = Device::meeting_in(&device.work_calendar, Utc::now());
    let err = device.provider.create_event(event, None).await.unwrap_err();
    assert!(err.is_offline());
    assert_eq!(err.to_string(), "You are offline. Connect to the Internet and try again.");

    let err = device.provider.sync_events(device.remote_account.clone(), device.work_calendar.clone()).await.unwrap_err();
    assert!(err.is_offline());
    assert_eq!(device.server.hits(), hits);

    device.navigator.set_on_line(true);
    let event = Device::meeting_in(&device.work_calendar, Utc::now());
    device.provider.create_event(event, None).await.unwrap();
}

#[tokio::test]
async fn sync_pulls_server_events() {
    let device = Device::new().await;
    let start = Utc::now();
    device.server.add_event(Device::meeting_in(&device.work_calendar, start));
    device.server.add_event(Device::meeting_in(&device.work_calendar, start + Duration::days(1)));

    device.provider.sync_events(device.remote_account.clone(), device.work_calendar.clone()).await.unwrap();
    assert_eq!(device.db.events_for_calendar(&CalendarId::from("work")).len(), 2);

    // Later changes on the server replace what the device knew
    device.server.add_event(Device::meeting_in(&device.work_calendar, start + Duration::days(2)));
    device.provider.sync_events(device.remote_account.clone(), device.work_calendar.clone()).await.unwrap();
    assert_eq!(device.db.events_for_calendar(&CalendarId::from("work")).len(), 3);
}

#[tokio::test]
async fn recurrences_are_expanded_into_busytimes() {
    let device = Device::new().await;
    device.navigator.set_on_line(false);
    let start = Utc::now();

    let mut data = EventData::new("Standup".to_string(), start, start + Duration::minutes(15));
    data.freq = Some(Frequency::Daily);
    let standup = Event::new(device.local_calendar.id().clone(), data);
    device.provider.create_event(standup, None).await.unwrap();
    assert_eq!(device.db.load_span(start, start + Duration::days(9)).len(), 1);

    device.provider.ensure_recurrences_expanded(start + Duration::days(8)).await.unwrap();
    let busytimes = device.db.load_span(start, start + Duration::days(9));
    assert_eq!(busytimes.len(), 9);
    assert_eq!(busytimes[1].start(), start + Duration::days(1));
    assert_eq!(device.db.expanded_until(), Some(start + Duration::days(8)));
}

#[tokio::test]
async fn server_failures_are_reported() {
    let device = Device::new().await;
    device.server.set_behaviour(MockBehaviour::fail_now(1));

    let event = Device::meeting_in(&device.work_calendar, Utc::now());
    let err = device.provider.create_event(event.clone(), None).await.unwrap_err();
    assert_eq!(err.name(), "remote");
    assert!(device.db.events_for_calendar(&CalendarId::from("work")).is_empty());

    // The failure was a one-off
    device.provider.create_event(event, None).await.unwrap();
    assert_eq!(device.db.events_for_calendar(&CalendarId::from("work")).len(), 1);
}

#[tokio::test]
async fn worker_waits_for_the_server_to_be_ready() {
    let device = Device::new().await;
    device.server.set_behaviour(MockBehaviour { not_ready_checks: 3, ..MockBehaviour::default() });

    let event = Device::meeting_in(&device.work_calendar, Utc::now());
    device.provider.create_event(event, None).await.unwrap();
    assert_eq!(device.server.events(&CalendarId::from("work")).len(), 1);
}

#[tokio::test]
async fn capabilities_depend_on_the_calendar() {
    let device = Device::new().await;

    let caps = device.provider.calendar_capabilities(device.local_calendar.clone()).await.unwrap();
    assert_eq!(caps, Capabilities::all());

    let mut read_only = device.work_calendar.clone();
    read_only.set_privileges(Capabilities::empty());
    device.db.add_calendar(read_only.clone());
    let caps = device.provider.calendar_capabilities(read_only).await.unwrap();
    assert!(caps.can_create_event() == false);
    assert!(caps.can_update_event() == false);
}

#[tokio::test]
async fn recurring_remote_events_cannot_be_edited_one_by_one() {
    let device = Device::new().await;
    let start = Utc::now();

    let single = Device::meeting_in(&device.work_calendar, start);
    let caps = device.provider.event_capabilities(single).await.unwrap();
    assert_eq!(caps, Capabilities::all());

    let mut weekly = Device::meeting_in(&device.work_calendar, start);
    weekly.remote.freq = Some(Frequency::Weekly);
    let caps = device.provider.event_capabilities(weekly.clone()).await.unwrap();
    assert_eq!(caps, Capabilities::CREATE_EVENT);

    // On-device calendars have no such restriction
    weekly = Device::meeting_in(&device.local_calendar, start);
    weekly.remote.freq = Some(Frequency::Weekly);
    let caps = device.provider.event_capabilities(weekly).await.unwrap();
    assert_eq!(caps, Capabilities::all());
}

#[tokio::test]
async fn worker_gives_up_on_a_server_that_never_gets_ready() {
    let device = Device::with_ready_attempts(3).await;
    let hits = device.server.hits();
    device.server.set_behaviour(MockBehaviour { not_ready_checks: 10, ..MockBehaviour::default() });

    let event = Device::meeting_in(&device.work_calendar, Utc::now());
    let err = device.provider.create_event(event, None).await.unwrap_err();
    assert_eq!(err.name(), "RetryError");
    assert_eq!(err.to_string(), "No success here :(");
    assert_eq!(device.server.hits(), hits);
    assert!(device.server.events(&CalendarId::from("work")).is_empty());
    assert!(device.db.events_for_calendar(&CalendarId::from("work")).is_empty());

    // Local requests do not wait for the server
    let event = Device::meeting_in(&device.local_calendar, Utc::now());
    device.provider.create_event(event, None).await.unwrap();
}
