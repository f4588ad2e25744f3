use std::fmt::Debug;
use std::sync::Arc;

use crate::base::iana::Class;
use crate::base::name::Name;
use crate::base::record::Record;

use super::error::StoreError;
use super::types::SharedRrset;

//------------ ZoneStore -----------------------------------------------------

/// The backing store of a zone.
pub trait ZoneStore: Debug + Sync + Send {
    /// Returns the class of the zone.
    fn class(&self) -> Class;

    /// Returns the apex name of the zone.
    fn apex_name(&self) -> &Name;

    /// Opens a consistent read-only view of the current zone content.
    ///
    /// Changes made to the zone after this has returned are not visible
    /// through the snapshot.
    fn open_snapshot(
        self: Arc<Self>,
    ) -> Result<Arc<dyn ZoneSnapshot>, StoreError>;
}

//------------ ZoneSnapshot --------------------------------------------------

/// A fixed version of a zone's content.
pub trait ZoneSnapshot: Debug + Send + Sync {
    fn apex_name(&self) -> &Name;

    fn class(&self) -> Class;

    /// Returns the SOA record at the apex.
    fn soa(&self) -> Result<Record, StoreError>;

    /// Creates a cursor over the owner names of the zone.
    ///
    /// Names are produced in canonical order, apex first.
    fn nodes(&self) -> Result<Box<dyn NodeCursor>, StoreError>;

    /// Returns the record sets at the given owner name.
    ///
    /// A name without any record sets results in an empty vec.
    fn rrsets(&self, owner: &Name) -> Result<Vec<SharedRrset>, StoreError>;
}

//------------ NodeCursor ----------------------------------------------------

/// Walks the owner names of a zone snapshot.
pub trait NodeCursor: Send {
    /// Moves to the next owner name.
    ///
    /// The first call returns the first name. Returns `Ok(None)` once all
    /// names have been produced.
    fn next_node(&mut self) -> Result<Option<Name>, StoreError>;
}
