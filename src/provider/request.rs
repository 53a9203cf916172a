//! The shape of routed requests, and the table of operations that the device can serve by itself

use std::fmt::{Display, Formatter};

use crate::account::Account;
use crate::calendar::Calendar;
use crate::id::AccountId;

/// The operations that can be routed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    GetAccount,
    FindCalendars,
    SyncEvents,
    EnsureRecurrencesExpanded,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    CreateICalComponentForEvent,
    CalendarCapabilities,
    EventCapabilities,
}

impl Method {
    /// Operations that the local provider serves directly, when the request is local
    pub fn is_local_method(&self) -> bool {
        match self {
            Method::CalendarCapabilities
            | Method::EventCapabilities
            | Method::FindCalendars
            | Method::GetAccount
            | Method::SyncEvents => true,
            _ => false,
        }
    }

    /// Operations that are local whatever the account
    pub fn always_local(&self) -> bool {
        *self == Method::EnsureRecurrencesExpanded
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::GetAccount => "getAccount",
            Method::FindCalendars => "findCalendars",
            Method::SyncEvents => "syncEvents",
            Method::EnsureRecurrencesExpanded => "ensureRecurrencesExpanded",
            Method::CreateEvent => "createEvent",
            Method::UpdateEvent => "updateEvent",
            Method::DeleteEvent => "deleteEvent",
            Method::CreateICalComponentForEvent => "createICalComponentForEvent",
            Method::CalendarCapabilities => "calendarCapabilities",
            Method::EventCapabilities => "eventCapabilities",
        };
        write!(f, "{}", name)
    }
}

/// The account and calendar an entity belongs to
#[derive(Clone, Debug, PartialEq)]
pub struct Owners {
    pub account: Account,
    pub calendar: Calendar,
}

/// What a request is about, as given by the caller
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    /// A bare account (possibly none at all), and optionally one of its calendars
    ByAccount { account: Option<Account>, calendar: Option<Calendar> },
    /// An entity whose owners have been resolved
    ByOwners(Owners),
}

/// Routing details attached to a request
#[derive(Clone, Debug, PartialEq)]
pub enum Details {
    Owners(Owners),
    /// Only an account was given. Its calendar slot holds the account itself.
    Account { account: Option<Account> },
}

impl Details {
    /// The account the request is about
    pub fn account_id(&self) -> Option<&AccountId> {
        match self {
            Details::Owners(owners) => Some(owners.account.id()),
            Details::Account { account } => account.as_ref().map(|a| a.id()),
        }
    }

    /// The identifier found in the calendar slot.
    ///
    /// For account-only requests this is the account identifier.
    pub fn calendar_slot(&self) -> Option<&str> {
        match self {
            Details::Owners(owners) => Some(owners.calendar.id().as_str()),
            Details::Account { account } => account.as_ref().map(|a| a.id().as_str()),
        }
    }
}

/// A request, as handed over to a provider
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub account: Option<Account>,
    pub calendar: Option<Calendar>,
    pub details: Details,
    /// Whether the operation must be synchronised with the server
    pub sync: bool,
}

impl Request {
    pub fn new(method: Method, target: Target) -> Self {
        match target {
            Target::ByOwners(owners) => Self {
                method,
                account: Some(owners.account.clone()),
                calendar: Some(owners.calendar.clone()),
                details: Details::Owners(owners),
                sync: false,
            },
            Target::ByAccount { account, calendar } => Self {
                method,
                details: Details::Account { account: account.clone() },
                account,
                calendar,
                sync: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_table() {
        let local_methods: Vec<Method> = vec![
            Method::GetAccount, Method::FindCalendars, Method::SyncEvents,
            Method::CalendarCapabilities, Method::EventCapabilities,
        ];
        for method in &local_methods {
            assert!(method.is_local_method(), "{} should be served locally", method);
            assert!(method.always_local() == false);
        }

        assert!(Method::EnsureRecurrencesExpanded.always_local());
        assert!(Method::EnsureRecurrencesExpanded.is_local_method() == false);
        assert!(Method::CreateEvent.is_local_method() == false);
        assert_eq!(Method::CreateICalComponentForEvent.to_string(), "createICalComponentForEvent");
    }

    #[test]
    fn owners_fill_the_request() {
        let account = Account::from_preset("caldav");
        let calendar = Calendar::new("work".into(), account.id().clone(), "Work".to_string());
        let request = Request::new(Method::CreateEvent, Target::ByOwners(Owners {
            account: account.clone(),
            calendar: calendar.clone(),
        }));

        assert_eq!(request.account.as_ref(), Some(&account));
        assert_eq!(request.calendar.as_ref(), Some(&calendar));
        assert_eq!(request.details.calendar_slot(), Some("work"));
        assert!(request.sync == false);
    }

    #[test]
    fn account_requests_alias_the_calendar_slot() {
        let account = Account::from_preset("caldav");
        let calendar = Calendar::new("work".into(), account.id().clone(), "Work".to_string());
        let request = Request::new(Method::SyncEvents, Target::ByAccount {
            account: Some(account.clone()),
            calendar: Some(calendar.clone()),
        });

        assert_eq!(request.calendar.as_ref(), Some(&calendar));
        assert_eq!(request.details.account_id(), Some(account.id()));
        assert_eq!(request.details.calendar_slot(), Some(account.id().as_str()));

        let empty = Request::new(Method::EnsureRecurrencesExpanded, Target::ByAccount { account: None, calendar: None });
        assert_eq!(empty.details.calendar_slot(), None);
    }
}
