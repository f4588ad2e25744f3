//! The content of a full zone transfer.

use std::sync::Arc;

use crate::base::record::{Record, RrStatus};
use crate::zonetree::ZoneSnapshot;

use super::enumerator::ZoneEnumerator;
use super::error::XfrError;

//------------ FullZoneStream ------------------------------------------------

/// All records of a zone snapshot except for the SOA.
///
/// https://datatracker.ietf.org/doc/html/rfc5936#section-2.2
/// 2.2.  AXFR Response
///   "The AXFR server MUST begin and end the AXFR response with the SOA
///    record of the zone. [...] It MUST NOT send the SOA record in between
///    other records."
///
/// The enclosing SOA records are added by a [`CompoundStream`], so this
/// stream leaves out the SOA wherever it appears in the walk.
///
/// [`CompoundStream`]: super::compound::CompoundStream
pub struct FullZoneStream {
    walk: ZoneEnumerator,
}

impl FullZoneStream {
    pub fn new(snapshot: Arc<dyn ZoneSnapshot>) -> Self {
        Self {
            walk: ZoneEnumerator::new(snapshot),
        }
    }

    pub fn first(&mut self) -> Result<RrStatus, XfrError> {
        let status = self.walk.first()?;
        self.skip_soa(status)
    }

    pub fn next(&mut self) -> Result<RrStatus, XfrError> {
        let status = self.walk.next()?;
        self.skip_soa(status)
    }

    pub fn current(&self) -> Option<&Record> {
        self.walk.current()
    }

    fn skip_soa(&mut self, mut status: RrStatus) -> Result<RrStatus, XfrError> {
        while status.is_ready()
            && self.walk.current().is_some_and(Record::is_soa)
        {
            status = self.walk.next()?;
        }
        Ok(status)
    }
}
