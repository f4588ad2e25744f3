//! The known set of zones.

use std::collections::{hash_map, HashMap};

use crate::base::iana::Class;
use crate::base::name::Name;

use super::error::ZoneTreeModificationError;
use super::zone::Zone;

//------------ ZoneTree ------------------------------------------------------

/// The collection of zones we are authoritative for.
#[derive(Debug, Default)]
pub struct ZoneTree {
    roots: HashMap<Class, HashMap<Name, Zone>>,
}

impl ZoneTree {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the zone with exactly the given apex name and class.
    pub fn get_zone(&self, apex_name: &Name, class: Class) -> Option<&Zone> {
        self.roots.get(&class)?.get(apex_name)
    }

    /// Returns the closest zone enclosing `qname`.
    pub fn find_zone(&self, qname: &Name, class: Class) -> Option<&Zone> {
        let zones = self.roots.get(&class)?;
        let mut name = Some(qname.clone());
        while let Some(current) = name {
            if let Some(zone) = zones.get(&current) {
                return Some(zone);
            }
            name = current.parent();
        }
        None
    }

    pub fn insert_zone(
        &mut self,
        zone: Zone,
    ) -> Result<(), ZoneTreeModificationError> {
        match self
            .roots
            .entry(zone.class())
            .or_default()
            .entry(zone.apex_name().clone())
        {
            hash_map::Entry::Occupied(_) => {
                Err(ZoneTreeModificationError::ZoneExists)
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(zone);
                Ok(())
            }
        }
    }

    pub fn remove_zone(
        &mut self,
        apex_name: &Name,
        class: Class,
    ) -> Result<(), ZoneTreeModificationError> {
        self.roots
            .get_mut(&class)
            .and_then(|zones| zones.remove(apex_name))
            .map(|_| ())
            .ok_or(ZoneTreeModificationError::ZoneDoesNotExist)
    }

    pub fn iter_zones(&self) -> impl Iterator<Item = &Zone> + '_ {
        self.roots.values().flat_map(|zones| zones.values())
    }
}
