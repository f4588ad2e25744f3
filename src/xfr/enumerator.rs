//! Walking all records of a zone snapshot.

use std::sync::Arc;

use tracing::trace;

use crate::base::name::Name;
use crate::base::record::{Record, RrStatus};
use crate::zonetree::{NodeCursor, SharedRrset, ZoneSnapshot};

use super::error::XfrError;

//------------ ZoneEnumerator ------------------------------------------------

/// A cursor over every record of a zone snapshot.
///
/// The cursor has three levels: the owner names of the zone, the record
/// sets of the current owner, and the records of the current set. Names
/// without any record sets and empty sets are skipped. For a given
/// snapshot, a complete walk produces every record exactly once.
///
/// Any failure of the underlying store ends the walk with an error. The
/// walk can be restarted with [`first`][Self::first].
pub struct ZoneEnumerator {
    snapshot: Arc<dyn ZoneSnapshot>,
    nodes: Option<Box<dyn NodeCursor>>,
    owner: Option<Name>,
    rrsets: Vec<SharedRrset>,
    rrset_idx: usize,
    rr_idx: usize,
    current: Option<Record>,
}

impl ZoneEnumerator {
    pub fn new(snapshot: Arc<dyn ZoneSnapshot>) -> Self {
        Self {
            snapshot,
            nodes: None,
            owner: None,
            rrsets: Vec::new(),
            rrset_idx: 0,
            rr_idx: 0,
            current: None,
        }
    }

    pub fn first(&mut self) -> Result<RrStatus, XfrError> {
        self.reset();
        let nodes = self.snapshot.nodes()?;
        self.nodes = Some(nodes);
        self.next_node()
    }

    pub fn next(&mut self) -> Result<RrStatus, XfrError> {
        if self.current.is_none() {
            return Ok(RrStatus::NoMore);
        }
        self.rr_idx += 1;
        if self.load_current() {
            return Ok(RrStatus::Ready);
        }
        self.next_node()
    }

    pub fn current(&self) -> Option<&Record> {
        self.current.as_ref()
    }

    fn reset(&mut self) {
        self.nodes = None;
        self.owner = None;
        self.rrsets.clear();
        self.rrset_idx = 0;
        self.rr_idx = 0;
        self.current = None;
    }

    /// Moves on to the next owner name that has records.
    fn next_node(&mut self) -> Result<RrStatus, XfrError> {
        loop {
            let Some(nodes) = self.nodes.as_mut() else {
                return Ok(RrStatus::NoMore);
            };
            let owner = match nodes.next_node() {
                Ok(Some(owner)) => owner,
                Ok(None) => {
                    trace!("Zone walk of {} complete", self.snapshot.apex_name());
                    self.reset();
                    return Ok(RrStatus::NoMore);
                }
                Err(err) => {
                    self.reset();
                    return Err(err.into());
                }
            };
            self.rrsets = match self.snapshot.rrsets(&owner) {
                Ok(rrsets) => rrsets,
                Err(err) => {
                    self.reset();
                    return Err(err.into());
                }
            };
            self.owner = Some(owner);
            self.rrset_idx = 0;
            self.rr_idx = 0;
            if self.load_current() {
                return Ok(RrStatus::Ready);
            }
        }
    }

    /// Loads the record at the current position of the current node.
    ///
    /// Skips to the following record sets if there is no record at the
    /// position. Returns whether a record was found.
    fn load_current(&mut self) -> bool {
        let Some(owner) = self.owner.as_ref() else {
            self.current = None;
            return false;
        };
        let class = self.snapshot.class();
        while let Some(rrset) = self.rrsets.get(self.rrset_idx) {
            if let Some(record) = rrset.record(self.rr_idx, owner, class) {
                self.current = Some(record);
                return true;
            }
            self.rrset_idx += 1;
            self.rr_idx = 0;
        }
        self.current = None;
        false
    }
}
