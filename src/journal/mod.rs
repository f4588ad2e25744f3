//! Zone change history.
//!
//! A journal keeps the differences between consecutive versions of a zone
//! so that incremental transfers can send just the changes. Each
//! [`ZoneDiff`] moves the zone from the serial of its start SOA to the
//! serial of its end SOA.
//!
//! A [`JournalReader`] replays the diffs covering a serial range in the
//! order incremental transfers need them: for every diff the old SOA, the
//! removed records, the new SOA, and finally the added records.

use core::fmt;
use std::fmt::Debug;

use crate::base::record::{Record, RrStatus};
use crate::base::serial::Serial;

pub use self::in_memory::InMemoryJournal;

mod in_memory;

//------------ Journal -------------------------------------------------------

/// Access to the change history of a zone.
pub trait Journal: Debug + Send + Sync {
    /// Opens a reader for the changes from `begin` to `end`.
    ///
    /// Fails with [`JournalError::NotFound`] if there is no history at all
    /// and with [`JournalError::OutOfRange`] if the history doesn't cover
    /// the range.
    fn open(
        &self,
        begin: Serial,
        end: Serial,
    ) -> Result<Box<dyn JournalReader>, JournalError>;
}

//------------ JournalReader -------------------------------------------------

/// A cursor over the records of a range of diffs.
pub trait JournalReader: Send {
    /// Moves to the first record.
    fn first(&mut self) -> Result<RrStatus, JournalError>;

    /// Moves to the next record.
    fn next(&mut self) -> Result<RrStatus, JournalError>;

    /// Returns the record the reader is positioned on.
    fn current(&self) -> Option<&Record>;
}

//------------ ZoneDiff ------------------------------------------------------

/// The differences between two consecutive versions of a zone.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ZoneDiff {
    start: Record,
    start_serial: Serial,
    removed: Vec<Record>,
    end: Record,
    end_serial: Serial,
    added: Vec<Record>,
}

impl ZoneDiff {
    /// Creates an empty diff between the two given SOA records.
    pub fn new(start: Record, end: Record) -> Result<Self, JournalError> {
        let start_serial = start
            .soa_serial()
            .ok_or(JournalError::Corrupt("diff start is not an SOA"))?;
        let end_serial = end
            .soa_serial()
            .ok_or(JournalError::Corrupt("diff end is not an SOA"))?;
        Ok(Self {
            start,
            start_serial,
            removed: Vec::new(),
            end,
            end_serial,
            added: Vec::new(),
        })
    }

    pub fn push_removed(&mut self, record: Record) {
        self.removed.push(record)
    }

    pub fn push_added(&mut self, record: Record) {
        self.added.push(record)
    }

    pub fn start_serial(&self) -> Serial {
        self.start_serial
    }

    pub fn end_serial(&self) -> Serial {
        self.end_serial
    }

    pub fn start(&self) -> &Record {
        &self.start
    }

    pub fn end(&self) -> &Record {
        &self.end
    }

    pub fn removed(&self) -> &[Record] {
        &self.removed
    }

    pub fn added(&self) -> &[Record] {
        &self.added
    }

    /// Returns the number of records in replay order, both SOAs included.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.removed.len() + self.added.len() + 2
    }

    /// Returns the record at `idx` in replay order.
    pub fn get(&self, idx: usize) -> Option<&Record> {
        let removed = self.removed.len();
        match idx {
            0 => Some(&self.start),
            idx if idx <= removed => self.removed.get(idx - 1),
            idx if idx == removed + 1 => Some(&self.end),
            idx => self.added.get(idx - removed - 2),
        }
    }

    /// Returns an iterator over the records in replay order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        (0..self.len()).filter_map(|idx| self.get(idx))
    }
}

//------------ JournalError --------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JournalError {
    /// There is no history for the zone.
    NotFound,

    /// The history doesn't reach back to the requested serial.
    OutOfRange,

    /// The history is inconsistent.
    Corrupt(&'static str),
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalError::NotFound => f.write_str("no journal"),
            JournalError::OutOfRange => {
                f.write_str("journal out of range")
            }
            JournalError::Corrupt(msg) => {
                write!(f, "journal corrupt: {msg}")
            }
        }
    }
}

impl std::error::Error for JournalError {}
