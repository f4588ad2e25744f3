//! A stream of a single record.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::base::record::{Record, RrStatus};

//------------ SingleRecordStream --------------------------------------------

/// A stream producing exactly one record.
///
/// Used with the current SOA of a zone, both on its own as the answer to
/// an IXFR request that is already up to date and as the brackets of a
/// complete transfer. In the latter case one stream is shared by both
/// brackets, which are never active at the same time.
#[derive(Debug)]
pub struct SingleRecordStream {
    record: Record,
    ready: AtomicBool,
}

impl SingleRecordStream {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            ready: AtomicBool::new(false),
        }
    }

    pub fn first(&self) -> RrStatus {
        self.ready.store(true, Ordering::Relaxed);
        RrStatus::Ready
    }

    pub fn next(&self) -> RrStatus {
        self.ready.store(false, Ordering::Relaxed);
        RrStatus::NoMore
    }

    pub fn current(&self) -> Option<&Record> {
        if self.ready.load(Ordering::Relaxed) {
            Some(&self.record)
        } else {
            None
        }
    }

    /// Returns the record regardless of the stream's position.
    pub fn record(&self) -> &Record {
        &self.record
    }
}
