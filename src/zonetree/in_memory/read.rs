//! Read access to in-memory zones.

use std::sync::Arc;

use tracing::trace;

use crate::base::iana::Class;
use crate::base::name::Name;
use crate::base::record::Record;
use crate::zonetree::error::StoreError;
use crate::zonetree::traits::{NodeCursor, ZoneSnapshot, ZoneStore};
use crate::zonetree::types::SharedRrset;

use super::nodes::ZoneApex;
use super::versioned::{Version, VersionMarker};

//------------ ReadZone ------------------------------------------------------

/// A snapshot of an in-memory zone pinned to one version.
#[derive(Clone, Debug)]
pub struct ReadZone {
    apex: Arc<ZoneApex>,
    version: Version,
    _version_marker: Arc<VersionMarker>,
}

impl ReadZone {
    pub(super) fn new(
        apex: Arc<ZoneApex>,
        version: Version,
        _version_marker: Arc<VersionMarker>,
    ) -> Self {
        trace!("Opening snapshot of zone {} at {version:?}", apex.name());
        ReadZone {
            apex,
            version,
            _version_marker,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }
}

//--- impl ZoneSnapshot

impl ZoneSnapshot for ReadZone {
    fn apex_name(&self) -> &Name {
        self.apex.name()
    }

    fn class(&self) -> Class {
        self.apex.class()
    }

    fn soa(&self) -> Result<Record, StoreError> {
        self.apex
            .get_soa(self.version)
            .ok_or(StoreError::MissingSoa)
    }

    fn nodes(&self) -> Result<Box<dyn NodeCursor>, StoreError> {
        Ok(Box::new(ReadNodeCursor {
            apex: self.apex.clone(),
            last: None,
            done: false,
        }))
    }

    fn rrsets(&self, owner: &Name) -> Result<Vec<SharedRrset>, StoreError> {
        self.apex.check_owner(owner)?;
        Ok(self.apex.rrsets(owner, self.version))
    }
}

//------------ ReadNodeCursor ------------------------------------------------

/// Walks all owner names of the zone in canonical order.
///
/// Names added after the snapshot was taken may show up but have no
/// record sets visible in the snapshot's version.
struct ReadNodeCursor {
    apex: Arc<ZoneApex>,
    last: Option<Name>,
    done: bool,
}

impl NodeCursor for ReadNodeCursor {
    fn next_node(&mut self) -> Result<Option<Name>, StoreError> {
        if self.done {
            return Ok(None);
        }
        let next = self.apex.next_name(self.last.as_ref());
        match next {
            Some(ref name) => self.last = Some(name.clone()),
            None => self.done = true,
        }
        Ok(next)
    }
}
