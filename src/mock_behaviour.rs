//! This module provides ways to tweak the mocked server, so that it can return errors on some tests
#![cfg(feature = "mock_remote_service")]

use crate::error::DynError;

/// This stores some behaviour tweaks, that describe how a mocked instance will behave during a given test
///
/// So that a functions fails _n_ times after _m_ initial successes, set `(m, n)` for the suited parameter
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// If this is true, every action will be allowed
    pub is_suspended: bool,

    /// How many readiness checks report the server as not ready yet
    pub not_ready_checks: u32,

    pub get_account_behaviour: (u32, u32),
    pub find_calendars_behaviour: (u32, u32),
    pub list_events_behaviour: (u32, u32),
    pub create_event_behaviour: (u32, u32),
    pub update_event_behaviour: (u32, u32),
    pub delete_event_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// All items will fail at once, for `n_fails` times
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            not_ready_checks: 0,
            get_account_behaviour: (0, n_fails),
            find_calendars_behaviour: (0, n_fails),
            list_events_behaviour: (0, n_fails),
            create_event_behaviour: (0, n_fails),
            update_event_behaviour: (0, n_fails),
            delete_event_behaviour: (0, n_fails),
        }
    }

    /// Suspend this mock behaviour until you call `resume`
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
    /// Make this behaviour active again
    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn is_ready(&mut self) -> bool {
        if self.is_suspended || self.not_ready_checks == 0 {
            return true;
        }
        self.not_ready_checks -= 1;
        log::debug!("Mock behaviour: not ready yet ({} checks left)", self.not_ready_checks);
        false
    }

    pub fn can_get_account(&mut self) -> Result<(), DynError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.get_account_behaviour, "get_account")
    }
    pub fn can_find_calendars(&mut self) -> Result<(), DynError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.find_calendars_behaviour, "find_calendars")
    }
    pub fn can_list_events(&mut self) -> Result<(), DynError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.list_events_behaviour, "list_events")
    }
    pub fn can_create_event(&mut self) -> Result<(), DynError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.create_event_behaviour, "create_event")
    }
    pub fn can_update_event(&mut self) -> Result<(), DynError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.update_event_behaviour, "update_event")
    }
    pub fn can_delete_event(&mut self) -> Result<(), DynError> {
        if self.is_suspended { return Ok(()) }
        decrement(&mut self.delete_event_behaviour, "delete_event")
    }
}


/// Return Ok(()) in case the value is `(1+, _)` or `(_, 0)`, or return Err and decrement otherwise
fn decrement(value: &mut (u32, u32), descr: &str) -> Result<(), DynError> {
    let remaining_successes = value.0;
    let remaining_failures = value.1;

    if remaining_successes > 0 {
        value.0 = value.0 - 1;
        log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
        Ok(())
    } else {
        if remaining_failures > 0 {
            value.1 = value.1 - 1;
            log::debug!("Mock behaviour: failing a {} ({:?})", descr, value);
            Err(format!("Mocked behaviour requires this {} to fail this time. ({:?})", descr, value).into())
        } else {
            log::debug!("Mock behaviour: allowing a {} ({:?})", descr, value);
            Ok(())
        }
    }
}
