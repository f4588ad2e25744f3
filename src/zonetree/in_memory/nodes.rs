//! The nodes of an in-memory zone.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::base::iana::{Class, Rtype};
use crate::base::name::Name;
use crate::base::record::Record;
use crate::journal::InMemoryJournal;
use crate::zonetree::error::StoreError;
use crate::zonetree::traits::{ZoneSnapshot, ZoneStore};
use crate::zonetree::types::SharedRrset;

use super::read::ReadZone;
use super::versioned::{Version, Versioned};
use super::write::{WriteZone, ZoneVersions};

//------------ ZoneApex ------------------------------------------------------

/// The in-memory representation of a zone.
///
/// All owner names are kept in a single map in canonical order, each with
/// its record sets keyed by type. Every record set keeps its history so
/// that readers of older versions are unaffected by later changes.
#[derive(Debug)]
pub struct ZoneApex {
    apex_name: Name,
    class: Class,
    nodes: RwLock<BTreeMap<Name, NodeRrsets>>,
    update_lock: Arc<Mutex<()>>,
    versions: ZoneVersions,
    journal: Option<Arc<InMemoryJournal>>,
}

impl ZoneApex {
    /// Creates a new, empty apex.
    pub fn new(apex_name: Name, class: Class) -> Self {
        Self::from_parts(apex_name, class, Default::default(), None)
    }

    pub(super) fn from_parts(
        apex_name: Name,
        class: Class,
        nodes: BTreeMap<Name, NodeRrsets>,
        journal: Option<Arc<InMemoryJournal>>,
    ) -> Self {
        ZoneApex {
            apex_name,
            class,
            nodes: RwLock::new(nodes),
            update_lock: Default::default(),
            versions: Default::default(),
            journal,
        }
    }

    pub fn name(&self) -> &Name {
        &self.apex_name
    }

    /// Returns the journal changes to the zone are recorded in.
    pub fn journal(&self) -> Option<&Arc<InMemoryJournal>> {
        self.journal.as_ref()
    }

    /// Starts changing the zone.
    ///
    /// Only one writer can exist at a time. This waits until any earlier
    /// writer has been committed or dropped.
    pub async fn write(self: Arc<Self>) -> WriteZone {
        let lock = self.update_lock.clone().lock_owned().await;
        let base = self.versions.current().0;
        WriteZone::new(self, lock, base)
    }

    pub(super) fn versions(&self) -> &ZoneVersions {
        &self.versions
    }

    /// Checks that `owner` belongs to this zone.
    pub(super) fn check_owner(&self, owner: &Name) -> Result<(), StoreError> {
        if owner.ends_with(&self.apex_name) {
            Ok(())
        } else {
            Err(StoreError::OutOfZone(owner.clone()))
        }
    }

    /// Returns the SOA record for the given version if available.
    pub fn get_soa(&self, version: Version) -> Option<Record> {
        self.get_rrset(&self.apex_name, Rtype::SOA, version)
            .and_then(|rrset| rrset.first(&self.apex_name, self.class))
    }

    pub fn get_rrset(
        &self,
        owner: &Name,
        rtype: Rtype,
        version: Version,
    ) -> Option<SharedRrset> {
        self.nodes.read().get(owner)?.get(rtype, version)
    }

    /// Returns all record sets of `owner` visible in `version`.
    pub fn rrsets(&self, owner: &Name, version: Version) -> Vec<SharedRrset> {
        self.nodes
            .read()
            .get(owner)
            .map(|node| node.iter(version).collect())
            .unwrap_or_default()
    }

    /// Returns the first owner name ordered after `last`.
    ///
    /// With `last` of `None`, returns the first name of the zone.
    pub fn next_name(&self, last: Option<&Name>) -> Option<Name> {
        let nodes = self.nodes.read();
        let mut range = match last {
            Some(last) => nodes.range((Bound::Excluded(last), Bound::Unbounded)),
            None => nodes.range::<Name, _>(..),
        };
        range.next().map(|(name, _)| name.clone())
    }

    pub(super) fn update_rrset(
        &self,
        owner: &Name,
        rrset: SharedRrset,
        version: Version,
    ) {
        self.nodes
            .write()
            .entry(owner.clone())
            .or_default()
            .update(rrset, version)
    }

    pub(super) fn remove_rrset(
        &self,
        owner: &Name,
        rtype: Rtype,
        version: Version,
    ) {
        if let Some(node) = self.nodes.write().get_mut(owner) {
            node.remove(rtype, version)
        }
    }

    pub(super) fn rollback(
        &self,
        touched: impl Iterator<Item = (Name, Rtype)>,
        version: Version,
    ) {
        let mut nodes = self.nodes.write();
        for (owner, rtype) in touched {
            if let Some(node) = nodes.get_mut(&owner) {
                node.rollback(rtype, version);
            }
        }
        nodes.retain(|_, node| !node.is_empty());
    }

    /// Forgets all content no longer visible from `oldest` onwards.
    pub(super) fn clean(&self, oldest: Version) {
        let mut nodes = self.nodes.write();
        for node in nodes.values_mut() {
            node.clean(oldest);
        }
        nodes.retain(|_, node| !node.is_empty());
    }
}

//--- impl ZoneStore

impl ZoneStore for ZoneApex {
    fn class(&self) -> Class {
        self.class
    }

    fn apex_name(&self) -> &Name {
        &self.apex_name
    }

    fn open_snapshot(
        self: Arc<Self>,
    ) -> Result<Arc<dyn ZoneSnapshot>, StoreError> {
        let current = self.versions.current();
        let (version, marker) = current.as_ref().clone();
        Ok(Arc::new(ReadZone::new(self, version, marker)))
    }
}

//------------ NodeRrsets ----------------------------------------------------

/// The versioned record sets of a single owner name.
#[derive(Default, Debug)]
pub struct NodeRrsets {
    rrsets: BTreeMap<Rtype, Versioned<SharedRrset>>,
}

impl NodeRrsets {
    pub fn get(&self, rtype: Rtype, version: Version) -> Option<SharedRrset> {
        self.rrsets.get(&rtype)?.get(version).cloned()
    }

    /// Returns the record sets visible in `version`, ordered by type.
    pub fn iter(
        &self,
        version: Version,
    ) -> impl Iterator<Item = SharedRrset> + '_ {
        self.rrsets
            .values()
            .filter_map(move |rrset| rrset.get(version).cloned())
    }

    pub fn update(&mut self, rrset: SharedRrset, version: Version) {
        self.rrsets
            .entry(rrset.rtype())
            .or_default()
            .update(version, rrset)
    }

    pub fn remove(&mut self, rtype: Rtype, version: Version) {
        if let Some(rrset) = self.rrsets.get_mut(&rtype) {
            rrset.remove(version)
        }
    }

    fn rollback(&mut self, rtype: Rtype, version: Version) {
        if let Some(rrset) = self.rrsets.get_mut(&rtype) {
            rrset.rollback(version)
        }
        self.rrsets.retain(|_, rrset| !rrset.is_empty());
    }

    fn clean(&mut self, oldest: Version) {
        for rrset in self.rrsets.values_mut() {
            rrset.clean(oldest)
        }
        self.rrsets.retain(|_, rrset| !rrset.is_empty());
    }

    fn is_empty(&self) -> bool {
        self.rrsets.is_empty()
    }
}
