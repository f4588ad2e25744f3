use std::fmt::Debug;
use std::sync::Arc;

use crate::base::iana::Class;
use crate::base::name::Name;
use crate::journal::Journal;

use super::error::StoreError;
use super::traits::{ZoneSnapshot, ZoneStore};
use super::types::ZoneKey;

//------------ Zone ----------------------------------------------------------

/// A single DNS zone.
///
/// The actual backing store is determined by the [`ZoneStore`] impl the
/// zone wraps, so in-memory zones and zones kept elsewhere can live side by
/// side in the same [`ZoneTree`]. A zone optionally has a [`Journal`] with
/// its change history, needed for incremental transfers.
///
/// [`ZoneTree`]: super::ZoneTree
#[derive(Clone, Debug)]
pub struct Zone {
    store: Arc<dyn ZoneStore>,
    journal: Option<Arc<dyn Journal>>,
}

impl Zone {
    /// Creates a new [`Zone`] instance with the given data.
    pub fn new(data: impl ZoneStore + 'static) -> Self {
        Self::from_store(Arc::new(data))
    }

    /// Creates a new [`Zone`] from an already shared backing store.
    pub fn from_store(store: Arc<dyn ZoneStore>) -> Self {
        Zone {
            store,
            journal: None,
        }
    }

    /// Attaches a change history to the zone.
    #[must_use]
    pub fn with_journal(mut self, journal: Option<Arc<dyn Journal>>) -> Self {
        self.journal = journal;
        self
    }

    /// Exchange this [`Zone`] wrapper for the actual underlying backing store
    /// implementation.
    pub fn into_inner(self) -> Arc<dyn ZoneStore> {
        self.store
    }

    /// Gets the CLASS of this zone.
    pub fn class(&self) -> Class {
        self.store.class()
    }

    /// Gets the apex name of this zone.
    pub fn apex_name(&self) -> &Name {
        self.store.apex_name()
    }

    /// Opens a read-only snapshot of the current zone content.
    pub fn open_snapshot(&self) -> Result<Arc<dyn ZoneSnapshot>, StoreError> {
        self.store.clone().open_snapshot()
    }

    /// Returns the change history of the zone if it has one.
    pub fn journal(&self) -> Option<&Arc<dyn Journal>> {
        self.journal.as_ref()
    }

    /// Gets a key that uniquely identifies this zone.
    pub fn key(&self) -> ZoneKey {
        (self.apex_name().clone(), self.class())
    }
}

impl AsRef<dyn ZoneStore> for Zone {
    fn as_ref(&self) -> &(dyn ZoneStore + 'static) {
        self.store.as_ref()
    }
}
