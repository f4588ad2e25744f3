//! Write access to in-memory zones.

use core::cmp::Ordering;
use core::mem;
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, trace};

use crate::base::iana::Rtype;
use crate::base::name::Name;
use crate::base::record::{Record, Soa};
use crate::base::serial::Serial;
use crate::journal::ZoneDiff;
use crate::zonetree::error::StoreError;
use crate::zonetree::traits::ZoneStore;
use crate::zonetree::types::Rrset;

use super::nodes::ZoneApex;
use super::versioned::{Version, VersionMarker};

//------------ WriteZone -----------------------------------------------------

/// A pending change to an in-memory zone.
///
/// Changes are made to a new version of the zone that stays invisible to
/// readers until [`commit`][Self::commit] publishes it. Dropping the writer
/// without committing discards all changes.
pub struct WriteZone {
    apex: Arc<ZoneApex>,
    _lock: OwnedMutexGuard<()>,
    base: Version,
    version: Version,
    touched: BTreeSet<(Name, Rtype)>,
    removed: Vec<Record>,
    added: Vec<Record>,
    committed: bool,
}

impl WriteZone {
    pub(super) fn new(
        apex: Arc<ZoneApex>,
        _lock: OwnedMutexGuard<()>,
        base: Version,
    ) -> Self {
        WriteZone {
            apex,
            _lock,
            base,
            version: base.next(),
            touched: BTreeSet::new(),
            removed: Vec::new(),
            added: Vec::new(),
            committed: false,
        }
    }

    /// Adds a record to the zone.
    ///
    /// Returns whether the record was added, which it isn't if it is
    /// already present. SOA records can't be added, [`commit`] replaces
    /// the SOA.
    ///
    /// [`commit`]: Self::commit
    pub fn add(&mut self, record: Record) -> Result<bool, StoreError> {
        self.check(&record)?;
        let owner = record.owner().clone();
        let mut rrset = match self.apex.get_rrset(
            &owner,
            record.rtype(),
            self.version,
        ) {
            Some(rrset) if rrset.contains(record.data()) => return Ok(false),
            Some(rrset) => rrset.as_rrset().clone(),
            None => Rrset::new(record.rtype(), record.ttl()),
        };
        rrset.set_ttl(record.ttl());
        rrset.push_data(record.data().clone());
        self.apex
            .update_rrset(&owner, rrset.into_shared(), self.version);
        self.touched.insert((owner, record.rtype()));
        self.added.push(record);
        Ok(true)
    }

    /// Removes a record from the zone.
    ///
    /// Returns whether the record was present. The TTL of `record` is
    /// ignored.
    pub fn remove(&mut self, record: &Record) -> Result<bool, StoreError> {
        self.check(record)?;
        let Some(rrset) =
            self.apex
                .get_rrset(record.owner(), record.rtype(), self.version)
        else {
            return Ok(false);
        };
        let mut rrset = rrset.as_rrset().clone();
        if !rrset.remove_data(record.data()) {
            return Ok(false);
        }
        let removed = Record::new(
            record.owner().clone(),
            record.class(),
            rrset.ttl(),
            record.data().clone(),
        );
        if rrset.is_empty() {
            self.apex
                .remove_rrset(record.owner(), record.rtype(), self.version);
        } else {
            self.apex.update_rrset(
                record.owner(),
                rrset.into_shared(),
                self.version,
            );
        }
        self.touched.insert((record.owner().clone(), record.rtype()));
        self.removed.push(removed);
        Ok(true)
    }

    /// Publishes the new version with the SOA serial set to `serial`.
    ///
    /// The serial has to be greater than the current one. If the zone has
    /// a journal, the changes are appended to it. Returns the changes.
    pub fn commit(mut self, serial: Serial) -> Result<ZoneDiff, StoreError> {
        let apex_name = self.apex.name().clone();
        let class = self.apex.class();
        let old_soa =
            self.apex.get_soa(self.base).ok_or(StoreError::MissingSoa)?;
        let soa = Soa::from_record_data(old_soa.data())
            .map_err(|_| StoreError::InvalidSoa)?;
        if serial.partial_cmp(&soa.serial()) != Some(Ordering::Greater) {
            return Err(StoreError::InvalidSoa);
        }
        let new_soa = Record::new(
            apex_name.clone(),
            class,
            old_soa.ttl(),
            soa.with_serial(serial).to_record_data(),
        );

        let mut diff = ZoneDiff::new(old_soa, new_soa.clone())?;
        for record in mem::take(&mut self.removed) {
            diff.push_removed(record);
        }
        for record in mem::take(&mut self.added) {
            diff.push_added(record);
        }
        if let Some(journal) = self.apex.journal() {
            journal.append(diff.clone())?;
        }

        self.apex.update_rrset(
            &apex_name,
            Rrset::from(new_soa).into_shared(),
            self.version,
        );
        self.committed = true;

        let versions = self.apex.versions();
        versions.update_current(self.version);
        self.apex.clean(versions.oldest_in_use());
        debug!(
            "Committed zone {apex_name} at serial {serial} ({} removed, {} added)",
            diff.removed().len(),
            diff.added().len()
        );
        Ok(diff)
    }

    fn check(&self, record: &Record) -> Result<(), StoreError> {
        if record.is_soa() {
            return Err(StoreError::InvalidSoa);
        }
        if record.class() != self.apex.class() {
            return Err(StoreError::ClassMismatch(record.class()));
        }
        self.apex.check_owner(record.owner())
    }
}

impl Drop for WriteZone {
    fn drop(&mut self) {
        if !self.committed {
            trace!("Rolling back uncommitted changes to {}", self.apex.name());
            self.apex
                .rollback(mem::take(&mut self.touched).into_iter(), self.version);
        }
    }
}

//------------ ZoneVersions --------------------------------------------------

/// The current version and the version marker it is handed out with.
pub type CurrentVersion = (Version, Arc<VersionMarker>);

/// An ordered collection of zone versions of which only one is "current".
///
/// The current version is published through an [`ArcSwap`] so that readers
/// never wait for a writer.
#[derive(Debug)]
pub struct ZoneVersions {
    current: ArcSwap<CurrentVersion>,
    all: Mutex<Vec<(Version, Weak<VersionMarker>)>>,
}

impl ZoneVersions {
    pub fn current(&self) -> Arc<CurrentVersion> {
        self.current.load_full()
    }

    pub fn update_current(&self, version: Version) -> Arc<VersionMarker> {
        let marker = Arc::new(VersionMarker);
        trace!(
            "Changing current zone version from {:?} to {version:?}",
            self.current.load().0
        );
        self.all.lock().push((version, Arc::downgrade(&marker)));
        self.current.store(Arc::new((version, marker.clone())));
        marker
    }

    /// Returns the oldest version still in use.
    ///
    /// Forgets about versions nobody uses anymore.
    pub fn oldest_in_use(&self) -> Version {
        let current = self.current.load().0;
        let mut all = self.all.lock();
        all.retain(|item| item.0 == current || item.1.strong_count() > 0);
        all.iter().map(|item| item.0).min().unwrap_or(current)
    }
}

impl Default for ZoneVersions {
    fn default() -> Self {
        let marker = Arc::new(VersionMarker);
        let weak_marker = Arc::downgrade(&marker);
        ZoneVersions {
            current: ArcSwap::from_pointee((Version::default(), marker)),
            all: Mutex::new(vec![(Version::default(), weak_marker)]),
        }
    }
}
