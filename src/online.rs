//! Connectivity probe

use std::sync::atomic::{AtomicBool, Ordering};

/// A host capability that reports whether the device is connected
pub trait NetworkStatus: Send + Sync {
    fn on_line(&self) -> bool;
}

/// A network status that can be toggled at runtime, e.g. by the host's connectivity notifications
#[derive(Debug)]
pub struct Navigator {
    on_line: AtomicBool,
}

impl Navigator {
    pub fn new(on_line: bool) -> Self {
        Self { on_line: AtomicBool::new(on_line) }
    }

    pub fn set_on_line(&self, on_line: bool) {
        log::debug!("Network is now {}", if on_line { "online" } else { "offline" });
        self.on_line.store(on_line, Ordering::SeqCst);
    }
}

impl NetworkStatus for Navigator {
    fn on_line(&self) -> bool {
        self.on_line.load(Ordering::SeqCst)
    }
}

/// Whether the device is online.
///
/// A host that cannot tell is considered offline.
pub fn is_online(status: Option<&dyn NetworkStatus>) -> bool {
    match status {
        None => false,
        Some(status) => status.on_line(),
    }
}
