//! Building a new zone.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::base::iana::{Class, Rtype};
use crate::base::name::Name;
use crate::base::record::{Record, Soa};
use crate::journal::{InMemoryJournal, Journal};
use crate::zonetree::error::{StoreError, ZoneTreeModificationError};
use crate::zonetree::types::Rrset;
use crate::zonetree::{Zone, ZoneTree};

use super::nodes::{NodeRrsets, ZoneApex};
use super::versioned::Version;

//------------ ZoneBuilder ---------------------------------------------------

/// Collects the initial content of an in-memory zone.
#[derive(Debug)]
pub struct ZoneBuilder {
    apex_name: Name,
    class: Class,
    nodes: BTreeMap<Name, BTreeMap<Rtype, Rrset>>,
    journal: Option<Arc<InMemoryJournal>>,
}

impl ZoneBuilder {
    pub fn new(apex_name: Name, class: Class) -> Self {
        ZoneBuilder {
            apex_name,
            class,
            nodes: BTreeMap::new(),
            journal: None,
        }
    }

    /// Records all later changes to the zone in `journal`.
    #[must_use]
    pub fn with_journal(mut self, journal: Arc<InMemoryJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Adds a record.
    ///
    /// Records of the same owner and type are collected into one set whose
    /// TTL is the smallest one seen.
    pub fn insert(&mut self, record: Record) -> Result<(), StoreError> {
        self.check(record.owner(), record.class())?;
        let owner = record.owner().clone();
        let rrsets = self.nodes.entry(owner).or_default();
        match rrsets.get_mut(&record.rtype()) {
            Some(rrset) => {
                if !rrset.contains(record.data()) {
                    rrset.push_record(record);
                }
            }
            None => {
                rrsets.insert(record.rtype(), Rrset::from(record));
            }
        }
        Ok(())
    }

    /// Adds a complete record set, replacing any earlier one.
    pub fn insert_rrset(
        &mut self,
        owner: &Name,
        rrset: Rrset,
    ) -> Result<(), StoreError> {
        self.check(owner, self.class)?;
        if !rrset.is_empty() {
            self.nodes
                .entry(owner.clone())
                .or_default()
                .insert(rrset.rtype(), rrset);
        }
        Ok(())
    }

    /// Creates the zone.
    ///
    /// The zone needs exactly one valid SOA record at its apex.
    pub fn build(self) -> Result<Arc<ZoneApex>, StoreError> {
        let soa = self
            .nodes
            .get(&self.apex_name)
            .and_then(|rrsets| rrsets.get(&Rtype::SOA))
            .ok_or(StoreError::MissingSoa)?;
        match soa.data() {
            [data] => {
                Soa::from_record_data(data)
                    .map_err(|_| StoreError::InvalidSoa)?;
            }
            _ => return Err(StoreError::InvalidSoa),
        }
        for (owner, rrsets) in &self.nodes {
            if owner != &self.apex_name && rrsets.contains_key(&Rtype::SOA) {
                return Err(StoreError::InvalidSoa);
            }
        }

        let nodes = self
            .nodes
            .into_iter()
            .map(|(owner, rrsets)| {
                let mut node = NodeRrsets::default();
                for rrset in rrsets.into_values() {
                    node.update(rrset.into_shared(), Version::default());
                }
                (owner, node)
            })
            .collect();
        Ok(Arc::new(ZoneApex::from_parts(
            self.apex_name,
            self.class,
            nodes,
            self.journal,
        )))
    }

    /// Creates the zone wrapped for use in a [`ZoneTree`].
    pub fn finalize(self) -> Result<Zone, StoreError> {
        self.build().map(Zone::from)
    }

    pub fn finalize_into_set(
        self,
        zone_set: &mut ZoneTree,
    ) -> Result<Arc<ZoneApex>, FinalizeError> {
        let apex = self.build().map_err(FinalizeError::Store)?;
        zone_set
            .insert_zone(Zone::from(apex.clone()))
            .map_err(FinalizeError::Tree)?;
        Ok(apex)
    }

    fn check(&self, owner: &Name, class: Class) -> Result<(), StoreError> {
        if class != self.class {
            return Err(StoreError::ClassMismatch(class));
        }
        if !owner.ends_with(&self.apex_name) {
            return Err(StoreError::OutOfZone(owner.clone()));
        }
        Ok(())
    }
}

//--- From<Arc<ZoneApex>> for Zone

impl From<Arc<ZoneApex>> for Zone {
    fn from(apex: Arc<ZoneApex>) -> Self {
        let journal = apex
            .journal()
            .cloned()
            .map(|journal| journal as Arc<dyn Journal>);
        Zone::from_store(apex).with_journal(journal)
    }
}

//------------ FinalizeError -------------------------------------------------

/// A zone could not be built and added to a tree.
#[derive(Clone, Debug)]
pub enum FinalizeError {
    Store(StoreError),
    Tree(ZoneTreeModificationError),
}

impl core::fmt::Display for FinalizeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FinalizeError::Store(err) => err.fmt(f),
            FinalizeError::Tree(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for FinalizeError {}
