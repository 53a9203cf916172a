//! The application context shared by the providers

use std::sync::Arc;

use crate::l10n::{Catalog, Localizer};
use crate::online::{self, NetworkStatus};
use crate::store::Db;

/// What the host application provides: its stores, its network status and its localization service
#[derive(Clone)]
pub struct App {
    db: Arc<Db>,
    network: Option<Arc<dyn NetworkStatus>>,
    l10n: Arc<dyn Localizer>,
}

impl App {
    /// Create a context. `network` is `None` when the host cannot report its connectivity.
    pub fn new(db: Arc<Db>, network: Option<Arc<dyn NetworkStatus>>, l10n: Arc<dyn Localizer>) -> Self {
        Self { db, network, l10n }
    }

    /// A context with the built-in strings
    pub fn with_default_l10n(db: Arc<Db>, network: Option<Arc<dyn NetworkStatus>>) -> Self {
        Self::new(db, network, Arc::new(Catalog::new()))
    }

    pub fn db(&self) -> &Arc<Db> { &self.db }
    pub fn l10n(&self) -> &dyn Localizer { self.l10n.as_ref() }

    pub fn is_online(&self) -> bool {
        online::is_online(self.network.as_deref())
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("db", &self.db)
            .field("has_network_status", &self.network.is_some())
            .finish()
    }
}
