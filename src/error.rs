//! Errors raised while routing requests

use thiserror::Error;

use crate::retry::RetryError;

/// The opaque error type used by stores, remote services and other collaborators
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that a [`Provider`](crate::provider::Provider) can report
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider was used before its application context was set
    #[error("Provider was not initialized!")]
    NotInitialized,

    #[error("Provider is already initialized")]
    AlreadyInitialized,

    /// A networked calendar was requested while the device is offline.
    /// The message is already localized and can be displayed as is.
    #[error("{message}")]
    Offline { message: String },

    #[error("Unable to find the owners of {0}")]
    OwnerNotFound(String),

    /// An adapter replied with something that does not fit the requested operation
    #[error("Unexpected reply to {0}")]
    Unexpected(String),

    #[error("The worker is not running anymore")]
    WorkerGone,

    #[error("Remote service error: {0}")]
    Remote(DynError),

    #[error("Store error: {0}")]
    Store(DynError),

    #[error(transparent)]
    Retry(#[from] RetryError),
}

impl ProviderError {
    /// A stable, machine-readable name for this error, so that callers can special-case some of them
    pub fn name(&self) -> &'static str {
        match self {
            ProviderError::NotInitialized => "not-initialized",
            ProviderError::AlreadyInitialized => "already-initialized",
            ProviderError::Offline { .. } => "offline",
            ProviderError::OwnerNotFound(_) => "owner-not-found",
            ProviderError::Unexpected(_) => "unexpected",
            ProviderError::WorkerGone => "worker-gone",
            ProviderError::Remote(_) => "remote",
            ProviderError::Store(_) => "store",
            ProviderError::Retry(err) => err.name(),
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, ProviderError::Offline { .. })
    }
}
