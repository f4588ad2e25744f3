use std::ops;
use std::sync::Arc;

use crate::base::iana::{Class, Rtype};
use crate::base::name::Name;
use crate::base::record::{Record, RecordData};

//------------ ZoneKey -------------------------------------------------------

/// A key that uniquely identifies a zone.
///
/// A zone is identified by the owner name of the apex and its class. Every
/// record in a zone must be at or under the apex owner name and be of the
/// same class.
pub type ZoneKey = (Name, Class);

//------------ Rrset ---------------------------------------------------------

/// The records of one type at one owner name.
///
/// All records of the set share a single TTL.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rrset {
    rtype: Rtype,
    ttl: u32,
    data: Vec<RecordData>,
}

impl Rrset {
    pub fn new(rtype: Rtype, ttl: u32) -> Self {
        Rrset {
            rtype,
            ttl,
            data: Vec::new(),
        }
    }

    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn data(&self) -> &[RecordData] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn contains(&self, data: &RecordData) -> bool {
        self.data.contains(data)
    }

    pub fn set_ttl(&mut self, ttl: u32) {
        self.ttl = ttl;
    }

    pub fn limit_ttl(&mut self, ttl: u32) {
        if self.ttl > ttl {
            self.ttl = ttl
        }
    }

    /// Adds record data to the set.
    ///
    /// Data of a different type is ignored. Returns whether the data was
    /// added.
    pub fn push_data(&mut self, data: RecordData) -> bool {
        if data.rtype() != self.rtype {
            return false;
        }
        self.data.push(data);
        true
    }

    /// Removes record data from the set, returning whether it was present.
    pub fn remove_data(&mut self, data: &RecordData) -> bool {
        match self.data.iter().position(|item| item == data) {
            Some(idx) => {
                self.data.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn push_record(&mut self, record: Record) -> bool {
        self.limit_ttl(record.ttl());
        self.push_data(record.into_data())
    }

    /// Returns the record at `idx` given the owner name and class.
    pub fn record(&self, idx: usize, owner: &Name, class: Class) -> Option<Record> {
        self.data
            .get(idx)
            .map(|data| Record::new(owner.clone(), class, self.ttl, data.clone()))
    }

    /// Returns the first record given the owner name and class.
    pub fn first(&self, owner: &Name, class: Class) -> Option<Record> {
        self.record(0, owner, class)
    }

    pub fn into_shared(self) -> SharedRrset {
        SharedRrset::new(self)
    }
}

impl From<Record> for Rrset {
    fn from(record: Record) -> Self {
        Rrset {
            rtype: record.rtype(),
            ttl: record.ttl(),
            data: vec![record.into_data()],
        }
    }
}

//------------ SharedRrset ---------------------------------------------------

/// An RRset behind an arc.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SharedRrset(Arc<Rrset>);

impl SharedRrset {
    pub fn new(rrset: Rrset) -> Self {
        SharedRrset(Arc::new(rrset))
    }

    pub fn as_rrset(&self) -> &Rrset {
        self.0.as_ref()
    }
}

//--- Deref, AsRef

impl ops::Deref for SharedRrset {
    type Target = Rrset;

    fn deref(&self) -> &Self::Target {
        self.as_rrset()
    }
}

impl AsRef<Rrset> for SharedRrset {
    fn as_ref(&self) -> &Rrset {
        self.as_rrset()
    }
}
