//! A journal kept in memory.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::base::record::{Record, RrStatus};
use crate::base::serial::Serial;

use super::{Journal, JournalError, JournalReader, ZoneDiff};

/// The number of diffs retained if nothing else is asked for.
const DEF_MAX_RETAINED: usize = 64;

//------------ InMemoryJournal -----------------------------------------------

/// A bounded in-memory history of zone diffs.
///
/// Appending a diff beyond the retention limit evicts the oldest one, so
/// requests for serials before the retained window are out of range.
#[derive(Debug)]
pub struct InMemoryJournal {
    diffs: RwLock<VecDeque<Arc<ZoneDiff>>>,
    max_retained: usize,
}

impl InMemoryJournal {
    pub fn new(max_retained: usize) -> Self {
        Self {
            diffs: Default::default(),
            max_retained: max_retained.max(1),
        }
    }

    /// Appends a diff.
    ///
    /// The diff has to start where the last one ended.
    pub fn append(&self, diff: ZoneDiff) -> Result<(), JournalError> {
        let mut diffs = self.diffs.write();
        if let Some(last) = diffs.back() {
            if last.end_serial() != diff.start_serial() {
                return Err(JournalError::Corrupt(
                    "diff does not continue the journal",
                ));
            }
        }
        trace!(
            "Appending diff {} -> {} to journal",
            diff.start_serial(),
            diff.end_serial()
        );
        diffs.push_back(Arc::new(diff));
        while diffs.len() > self.max_retained {
            if let Some(evicted) = diffs.pop_front() {
                trace!(
                    "Evicting diff {} -> {} from journal",
                    evicted.start_serial(),
                    evicted.end_serial()
                );
            }
        }
        Ok(())
    }

    /// Returns the oldest serial an incremental transfer can start from.
    pub fn first_serial(&self) -> Option<Serial> {
        self.diffs.read().front().map(|diff| diff.start_serial())
    }

    /// Returns the serial of the most recent version.
    pub fn last_serial(&self) -> Option<Serial> {
        self.diffs.read().back().map(|diff| diff.end_serial())
    }

    pub fn len(&self) -> usize {
        self.diffs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.read().is_empty()
    }
}

impl Default for InMemoryJournal {
    fn default() -> Self {
        Self::new(DEF_MAX_RETAINED)
    }
}

//--- Journal

impl Journal for InMemoryJournal {
    fn open(
        &self,
        begin: Serial,
        end: Serial,
    ) -> Result<Box<dyn JournalReader>, JournalError> {
        let diffs = self.diffs.read();
        if diffs.is_empty() {
            return Err(JournalError::NotFound);
        }
        let start = diffs
            .iter()
            .position(|diff| diff.start_serial() == begin)
            .ok_or(JournalError::OutOfRange)?;

        let mut selected = Vec::new();
        let mut serial = begin;
        for diff in diffs.iter().skip(start) {
            if serial == end {
                break;
            }
            if diff.start_serial() != serial {
                return Err(JournalError::Corrupt("gap in journal"));
            }
            selected.push(diff.clone());
            serial = diff.end_serial();
        }
        if serial != end {
            return Err(JournalError::OutOfRange);
        }
        Ok(Box::new(InMemoryJournalReader::new(selected)))
    }
}

//------------ InMemoryJournalReader -----------------------------------------

struct InMemoryJournalReader {
    diffs: Vec<Arc<ZoneDiff>>,
    diff: usize,
    pos: usize,
    ready: bool,
}

impl InMemoryJournalReader {
    fn new(diffs: Vec<Arc<ZoneDiff>>) -> Self {
        Self {
            diffs,
            diff: 0,
            pos: 0,
            ready: false,
        }
    }

    fn status(&mut self) -> RrStatus {
        self.ready = self.diff < self.diffs.len();
        if self.ready {
            RrStatus::Ready
        } else {
            RrStatus::NoMore
        }
    }
}

impl JournalReader for InMemoryJournalReader {
    fn first(&mut self) -> Result<RrStatus, JournalError> {
        self.diff = 0;
        self.pos = 0;
        Ok(self.status())
    }

    fn next(&mut self) -> Result<RrStatus, JournalError> {
        if let Some(diff) = self.diffs.get(self.diff) {
            self.pos += 1;
            if self.pos >= diff.len() {
                self.diff += 1;
                self.pos = 0;
            }
        }
        Ok(self.status())
    }

    fn current(&self) -> Option<&Record> {
        if !self.ready {
            return None;
        }
        self.diffs.get(self.diff)?.get(self.pos)
    }
}

//============ Tests =========================================================
