//! Routes a few operations through a provider, both online and offline

use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};

use calendar_router::account::Account;
use calendar_router::calendar::Calendar;
use calendar_router::event::{Event, EventData, Frequency};
use calendar_router::l10n::Catalog;
use calendar_router::mock::MockServer;
use calendar_router::online::Navigator;
use calendar_router::provider::local::Local;
use calendar_router::provider::worker::Worker;
use calendar_router::store::Db;
use calendar_router::{App, DeviceProvider};

const DB_FILE: &str = "router_demo_db.json";


#[tokio::main]
async fn main() {
    env_logger::init();

    let db_path = Path::new(DB_FILE);
    let db = match Db::from_file(db_path) {
        Ok(db) => db,
        Err(err) => {
            log::warn!("Invalid database file: {}. Using an empty database", err);
            Db::new(db_path)
        }
    };
    let db = Arc::new(db);
    let l10n = Arc::new(Catalog::new());
    let navigator = Arc::new(Navigator::new(true));

    let server = MockServer::new();
    server.add_user("john", "secret");
    let work_calendar = Calendar::new("work".into(), "unused".into(), "Work".to_string());
    server.add_calendar(work_calendar);

    let local = Arc::new(Local::new(db.clone(), l10n.clone()));
    let worker = Worker::spawn(local.clone(), server.clone());
    let provider = DeviceProvider::new(local, worker);

    if let Err(err) = provider.get_account(Account::from_preset("local")).await {
        println!("As expected, the provider refuses requests before it is initialized: {}", err);
    }
    let app = Arc::new(App::new(db.clone(), Some(navigator.clone()), l10n));
    if let Err(err) = provider.set_app(app) {
        log::error!("Unable to initialize the provider: {}", err);
        return;
    }

    // The on-device account
    let local_account = match provider.get_account(Account::from_preset("local")).await {
        Ok(account) => account,
        Err(err) => {
            log::error!("Unable to get the local account: {}", err);
            return;
        }
    };
    let local_calendars = provider.find_calendars(local_account.clone()).await.unwrap_or_default();

    // A networked account
    let url = "https://caldav.example.com/".parse().expect("valid URL");
    let remote_account = Account::new_remote("caldav", url, "john".to_string(), "secret".to_string());
    let remote_account = match provider.get_account(remote_account).await {
        Ok(account) => account,
        Err(err) => {
            log::error!("Unable to get the remote account: {}", err);
            return;
        }
    };
    let remote_calendars = provider.find_calendars(remote_account.clone()).await.unwrap_or_default();

    let start = Utc::now();
    let mut standup = EventData::new("Standup".to_string(), start, start + Duration::minutes(15));
    standup.freq = Some(Frequency::Daily);
    standup.until = Some(start + Duration::days(30));
    let standup = Event::new("local-first".into(), standup);
    if let Err(err) = provider.create_event(standup, None).await {
        log::error!("Unable to create a local event: {}", err);
    }

    let review = Event::new("work".into(), EventData::new("Review".to_string(), start, start + Duration::hours(1)));
    if let Err(err) = provider.create_event(review.clone(), None).await {
        log::error!("Unable to create a remote event: {}", err);
    }

    navigator.set_on_line(false);
    match provider.create_event(review, None).await {
        Err(err) if err.is_offline() => println!("Offline: {}", err),
        Err(err) => log::error!("Unexpected error: {}", err),
        Ok(_) => log::error!("This should have been refused while offline"),
    }
    if let Err(err) = provider.ensure_recurrences_expanded(start + Duration::days(7)).await {
        log::error!("Unable to expand recurrences: {}", err);
    }

    println!("---- Calendars -----");
    calendar_router::utils::print_calendar_list(&db, &local_calendars);
    calendar_router::utils::print_calendar_list(&db, &remote_calendars);
    println!("---- Next week -----");
    calendar_router::utils::print_busytimes(&db, start, start + Duration::days(7));
    println!("The server received {} requests", server.hits());

    if let Err(err) = db.save_to_file() {
        log::warn!("Unable to save the database: {}", err);
    }
}
