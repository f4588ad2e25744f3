//! The record streams a transfer is assembled from.
//!
//! Every stream is a cursor: [`first`] moves to the first record, [`next`]
//! to the following one, and [`current`] returns the record the cursor is
//! on. Both moves report [`RrStatus::NoMore`] once the stream is
//! exhausted. [`current`] only returns a record after the last move
//! reported [`RrStatus::Ready`].
//!
//! [`first`]: XfrStream::first
//! [`next`]: XfrStream::next
//! [`current`]: XfrStream::current

use std::sync::Arc;

use crate::base::record::{Record, RrStatus};

use super::axfr::FullZoneStream;
use super::compound::CompoundStream;
use super::error::XfrError;
use super::ixfr::DiffStream;
use super::soa::SingleRecordStream;

//------------ XfrStream -----------------------------------------------------

/// One of the streams of records making up a transfer.
pub enum XfrStream {
    /// All records of a zone except its SOA.
    FullZone(FullZoneStream),

    /// The changes between two versions of a zone.
    Diff(DiffStream),

    /// A single record, usually the SOA.
    Single(Arc<SingleRecordStream>),

    /// Some data bracketed by a single record.
    Compound(Box<CompoundStream>),
}

impl XfrStream {
    pub fn first(&mut self) -> Result<RrStatus, XfrError> {
        match self {
            XfrStream::FullZone(stream) => stream.first(),
            XfrStream::Diff(stream) => stream.first(),
            XfrStream::Single(stream) => Ok(stream.first()),
            XfrStream::Compound(stream) => stream.first(),
        }
    }

    pub fn next(&mut self) -> Result<RrStatus, XfrError> {
        match self {
            XfrStream::FullZone(stream) => stream.next(),
            XfrStream::Diff(stream) => stream.next(),
            XfrStream::Single(stream) => Ok(stream.next()),
            XfrStream::Compound(stream) => stream.next(),
        }
    }

    pub fn current(&self) -> Option<&Record> {
        match self {
            XfrStream::FullZone(stream) => stream.current(),
            XfrStream::Diff(stream) => stream.current(),
            XfrStream::Single(stream) => stream.current(),
            XfrStream::Compound(stream) => stream.current(),
        }
    }

    /// Produces all remaining records from the start.
    ///
    /// Mostly useful for testing.
    pub fn collect_records(&mut self) -> Result<Vec<Record>, XfrError> {
        let mut res = Vec::new();
        let mut status = self.first()?;
        while status.is_ready() {
            let record = self
                .current()
                .ok_or(XfrError::Internal("ready stream without record"))?;
            res.push(record.clone());
            status = self.next()?;
        }
        Ok(res)
    }
}

//--- From

impl From<FullZoneStream> for XfrStream {
    fn from(stream: FullZoneStream) -> Self {
        XfrStream::FullZone(stream)
    }
}

impl From<DiffStream> for XfrStream {
    fn from(stream: DiffStream) -> Self {
        XfrStream::Diff(stream)
    }
}

impl From<Arc<SingleRecordStream>> for XfrStream {
    fn from(stream: Arc<SingleRecordStream>) -> Self {
        XfrStream::Single(stream)
    }
}

impl From<CompoundStream> for XfrStream {
    fn from(stream: CompoundStream) -> Self {
        XfrStream::Compound(Box::new(stream))
    }
}
