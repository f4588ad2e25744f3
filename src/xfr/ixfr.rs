//! The content of an incremental zone transfer.

use crate::base::record::{Record, RrStatus};
use crate::base::serial::Serial;
use crate::journal::{Journal, JournalReader};

use super::error::XfrError;

//------------ DiffStream ----------------------------------------------------

/// The journaled changes between two serials.
///
/// https://datatracker.ietf.org/doc/html/rfc1995#section-4
/// 4. Response Format
///   "Each difference sequence represents one update to the zone (one SOA
///    serial change) consisting of deleted RRs and added RRs.  The first
///    RR of the deleted RRs is the older SOA RR and the first RR of the
///    added RRs is the newer SOA RR."
///
/// The stream produces the difference sequences exactly as the journal
/// replays them. The server's current SOA enclosing them is added by a
/// [`CompoundStream`].
///
/// [`CompoundStream`]: super::compound::CompoundStream
pub struct DiffStream {
    reader: Box<dyn JournalReader>,
}

impl DiffStream {
    /// Opens the changes from `begin` to `end`.
    ///
    /// Fails with [`XfrError::HistoryUnavailable`] if the journal doesn't
    /// cover the range.
    pub fn open(
        journal: &dyn Journal,
        begin: Serial,
        end: Serial,
    ) -> Result<Self, XfrError> {
        let reader = journal.open(begin, end)?;
        Ok(Self { reader })
    }

    pub fn first(&mut self) -> Result<RrStatus, XfrError> {
        self.reader.first().map_err(XfrError::Journal)
    }

    pub fn next(&mut self) -> Result<RrStatus, XfrError> {
        self.reader.next().map_err(XfrError::Journal)
    }

    pub fn current(&self) -> Option<&Record> {
        self.reader.current()
    }
}
