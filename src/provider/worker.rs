//! The provider that forwards requests to a background worker, which talks to the CalDAV server
//!
//! Requests are marshalled over a channel to a task that owns the remote service.
//! Accounts and calendars found on the server are saved into the on-device stores.
//! Requests that do not need to be synchronised (`request.sync == false`) are executed by the worker against the on-device stores only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};

use crate::account::Account;
use crate::calendar::{Calendar, Capabilities};
use crate::config::{WORKER_CHANNEL_CAPACITY, WORKER_READY_ATTEMPTS, WORKER_READY_POLL_INTERVAL};
use crate::error::ProviderError;
use crate::event::{Busytime, Event};
use crate::id::CalendarId;
use crate::retry::retry;
use crate::traits::{CalendarProvider, RemoteService};
use super::local::Local;
use super::request::Request;

/// The arguments of an operation, as sent to the worker
#[derive(Debug)]
enum Call {
    GetAccount,
    FindCalendars,
    SyncEvents,
    EnsureRecurrencesExpanded { max_date: DateTime<Utc> },
    CreateEvent { event: Event, busytime: Option<Busytime> },
    UpdateEvent { event: Event, busytime: Option<Busytime> },
    DeleteEvent { event: Event, busytime: Option<Busytime> },
    CreateICalComponentForEvent { event: Event },
    CalendarCapabilities { calendar: Calendar },
    EventCapabilities { event: Event },
}

/// What the worker sends back
#[derive(Debug)]
enum Reply {
    Account(Account),
    Calendars(HashMap<CalendarId, Calendar>),
    Done,
    Event(Event),
    ICal(String),
    Capabilities(Capabilities),
}

struct Message {
    request: Request,
    call: Call,
    respond_to: oneshot::Sender<Result<Reply, ProviderError>>,
}

/// A handle to the background worker
#[derive(Clone)]
pub struct Worker {
    sender: mpsc::Sender<Message>,
}

impl Worker {
    /// Spawns the worker on the current tokio runtime
    pub fn spawn<S>(local: Arc<Local>, remote: S) -> Self
    where
        S: RemoteService + 'static,
    {
        Self::spawn_with(local, remote, WORKER_READY_ATTEMPTS)
    }

    /// Spawns a worker that checks at most `ready_attempts` times whether the remote service is ready, before rejecting a request
    pub fn spawn_with<S>(local: Arc<Local>, remote: S, ready_attempts: u32) -> Self
    where
        S: RemoteService + 'static,
    {
        let (sender, receiver) = mpsc::channel(WORKER_CHANNEL_CAPACITY);
        let context = WorkerContext { local, remote: Arc::new(remote), ready_attempts };
        tokio::spawn(context.run(receiver));
        Self { sender }
    }

    async fn call(&self, request: Request, call: Call) -> Result<Reply, ProviderError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(Message { request, call, respond_to }).await
            .map_err(|_| ProviderError::WorkerGone)?;

        match response.await {
            Err(_) => Err(ProviderError::WorkerGone),
            Ok(result) => result,
        }
    }
}

/// Returns the content of a `Reply` variant, or an error when the worker replied something else
macro_rules! expect_reply {
    ($reply:expr, $variant:ident, $method:expr) => {
        match $reply {
            Reply::$variant(value) => Ok(value),
            other => Err(ProviderError::Unexpected(format!("{} ({:?})", $method, other))),
        }
    }
}

#[async_trait]
impl CalendarProvider for Worker {
    async fn get_account(&self, request: Request) -> Result<Account, ProviderError> {
        let method = request.method;
        expect_reply!(self.call(request, Call::GetAccount).await?, Account, method)
    }

    async fn find_calendars(&self, request: Request) -> Result<HashMap<CalendarId, Calendar>, ProviderError> {
        let method = request.method;
        expect_reply!(self.call(request, Call::FindCalendars).await?, Calendars, method)
    }

    async fn sync_events(&self, request: Request) -> Result<(), ProviderError> {
        self.call(request, Call::SyncEvents).await.map(|_| ())
    }

    async fn ensure_recurrences_expanded(&self, request: Request, max_date: DateTime<Utc>) -> Result<(), ProviderError> {
        self.call(request, Call::EnsureRecurrencesExpanded { max_date }).await.map(|_| ())
    }

    async fn create_event(&self, request: Request, event: Event, busytime: Option<Busytime>) -> Result<Event, ProviderError> {
        let method = request.method;
        expect_reply!(self.call(request, Call::CreateEvent { event, busytime }).await?, Event, method)
    }

    async fn update_event(&self, request: Request, event: Event, busytime: Option<Busytime>) -> Result<Event, ProviderError> {
        let method = request.method;
        expect_reply!(self.call(request, Call::UpdateEvent { event, busytime }).await?, Event, method)
    }

    async fn delete_event(&self, request: Request, event: Event, busytime: Option<Busytime>) -> Result<(), ProviderError> {
        self.call(request, Call::DeleteEvent { event, busytime }).await.map(|_| ())
    }

    async fn create_ical_component_for_event(&self, request: Request, event: Event) -> Result<String, ProviderError> {
        let method = request.method;
        expect_reply!(self.call(request, Call::CreateICalComponentForEvent { event }).await?, ICal, method)
    }

    async fn calendar_capabilities(&self, request: Request, calendar: Calendar) -> Result<Capabilities, ProviderError> {
        let method = request.method;
        expect_reply!(self.call(request, Call::CalendarCapabilities { calendar }).await?, Capabilities, method)
    }

    async fn event_capabilities(&self, request: Request, event: Event) -> Result<Capabilities, ProviderError> {
        let method = request.method;
        expect_reply!(self.call(request, Call::EventCapabilities { event }).await?, Capabilities, method)
    }
}


/// What the background task owns
#[derive(Clone)]
struct WorkerContext {
    local: Arc<Local>,
    remote: Arc<dyn RemoteService>,
    ready_attempts: u32,
}

impl WorkerContext {
    async fn run(self, mut receiver: mpsc::Receiver<Message>) {
        log::debug!("Worker started");
        while let Some(message) = receiver.recv().await {
            let context = self.clone();
            tokio::spawn(async move {
                let Message { request, call, respond_to } = message;
                let result = context.handle(request, call).await;
                if respond_to.send(result).is_err() {
                    log::debug!("A caller stopped waiting for its worker reply");
                }
            });
        }
        log::debug!("Worker stopped: every handle has been dropped");
    }

    async fn handle(&self, request: Request, call: Call) -> Result<Reply, ProviderError> {
        if request.sync == false {
            return self.handle_on_device(request, call).await;
        }

        // The remote service may still be starting up. Wait for it a bit.
        retry(|| {
            let remote = Arc::clone(&self.remote);
            async move { remote.is_ready().await }
        }, Some(WORKER_READY_POLL_INTERVAL), self.ready_attempts).await?;

        log::debug!("Worker handles {} with the server", request.method);
        self.handle_with_server(request, call).await
    }

    async fn handle_on_device(&self, request: Request, call: Call) -> Result<Reply, ProviderError> {
        log::debug!("Worker handles {} on the device", request.method);
        let local = &self.local;
        let reply = match call {
            Call::GetAccount => Reply::Account(local.get_account(request).await?),
            Call::FindCalendars => Reply::Calendars(local.find_calendars(request).await?),
            Call::SyncEvents => { local.sync_events(request).await?; Reply::Done },
            Call::EnsureRecurrencesExpanded { max_date } => { local.ensure_recurrences_expanded(request, max_date).await?; Reply::Done },
            Call::CreateEvent { event, busytime } => Reply::Event(local.create_event(request, event, busytime).await?),
            Call::UpdateEvent { event, busytime } => Reply::Event(local.update_event(request, event, busytime).await?),
            Call::DeleteEvent { event, busytime } => { local.delete_event(request, event, busytime).await?; Reply::Done },
            Call::CreateICalComponentForEvent { event } => Reply::ICal(local.create_ical_component_for_event(request, event).await?),
            Call::CalendarCapabilities { calendar } => Reply::Capabilities(local.calendar_capabilities(request, calendar).await?),
            Call::EventCapabilities { event } => Reply::Capabilities(local.event_capabilities(request, event).await?),
        };
        Ok(reply)
    }

    async fn handle_with_server(&self, request: Request, call: Call) -> Result<Reply, ProviderError> {
        let remote = &self.remote;
        let local = &self.local;

        let reply = match call {
            Call::GetAccount => {
                let account = request_account(&request)?;
                let account = remote.get_account(account).await.map_err(ProviderError::Remote)?;
                local.db().add_account(account.clone());
                Reply::Account(account)
            },

            Call::FindCalendars => {
                let account = request_account(&request)?;
                let mut calendars = HashMap::new();
                for mut calendar in remote.find_calendars(account).await.map_err(ProviderError::Remote)? {
                    calendar.set_account_id(account.id().clone());
                    local.db().add_calendar(calendar.clone());
                    calendars.insert(calendar.id().clone(), calendar);
                }
                Reply::Calendars(calendars)
            },

            Call::SyncEvents => {
                let account = request_account(&request)?;
                let calendar = request.calendar.as_ref()
                    .ok_or_else(|| ProviderError::Unexpected(format!("{} without any calendar", request.method)))?;
                let events = remote.list_events(account, calendar).await.map_err(ProviderError::Remote)?;
                log::debug!("Got {} events from the server for calendar {}", events.len(), calendar.name());
                local.replace_calendar_events(calendar.id(), events)?;
                Reply::Done
            },

            Call::EnsureRecurrencesExpanded { max_date } => {
                local.ensure_recurrences_expanded(request, max_date).await?;
                Reply::Done
            },

            Call::CreateEvent { event, .. } => {
                let (account, calendar) = request_owners(&request)?;
                let mut event = event;
                event.ensure_id();
                let stored = remote.create_event(account, calendar, &event).await.map_err(ProviderError::Remote)?;
                Reply::Event(local.store_event(stored)?)
            },

            Call::UpdateEvent { event, .. } => {
                let (account, calendar) = request_owners(&request)?;
                let stored = remote.update_event(account, calendar, &event).await.map_err(ProviderError::Remote)?;
                Reply::Event(local.store_event(stored)?)
            },

            Call::DeleteEvent { event, busytime } => {
                let (account, calendar) = request_owners(&request)?;
                remote.delete_event(account, calendar, &event).await.map_err(ProviderError::Remote)?;
                local.delete_event(request, event, busytime).await?;
                Reply::Done
            },

            Call::CreateICalComponentForEvent { event } => {
                Reply::ICal(crate::ical::build_from(&event).map_err(ProviderError::Store)?)
            },

            Call::CalendarCapabilities { calendar } => {
                let calendar = request.calendar.as_ref().unwrap_or(&calendar);
                Reply::Capabilities(calendar.privileges())
            },

            Call::EventCapabilities { event } => {
                let (_, calendar) = request_owners(&request)?;
                let mut capabilities = calendar.privileges();
                if event.remote.is_recurring() {
                    // Recurring events can only be edited as a whole series on the server
                    capabilities.remove(Capabilities::UPDATE_EVENT | Capabilities::DELETE_EVENT);
                }
                Reply::Capabilities(capabilities)
            },
        };
        Ok(reply)
    }
}

fn request_account(request: &Request) -> Result<&Account, ProviderError> {
    request.account.as_ref()
        .ok_or_else(|| ProviderError::Unexpected(format!("{} without any account", request.method)))
}

fn request_owners(request: &Request) -> Result<(&Account, &Calendar), ProviderError> {
    let account = request_account(request)?;
    let calendar = request.calendar.as_ref()
        .ok_or_else(|| ProviderError::Unexpected(format!("{} without any calendar", request.method)))?;
    Ok((account, calendar))
}
