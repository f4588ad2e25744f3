//! Bracketing a stream with another record.

use std::sync::Arc;

use crate::base::record::{Record, RrStatus};

use super::error::XfrError;
use super::soa::SingleRecordStream;
use super::stream::XfrStream;

//------------ CompoundStream ------------------------------------------------

/// A stream of data preceded and followed by the same single record.
///
/// The components are produced in order: the opening record, the data,
/// and the closing record. Once the closing record has been produced, the
/// stream stays exhausted and can't be restarted.
pub struct CompoundStream {
    components: [XfrStream; 3],
    state: usize,
    result: Option<RrStatus>,
}

impl CompoundStream {
    pub fn new(bracket: Arc<SingleRecordStream>, data: XfrStream) -> Self {
        Self {
            components: [
                XfrStream::Single(bracket.clone()),
                data,
                XfrStream::Single(bracket),
            ],
            state: 0,
            result: None,
        }
    }

    pub fn first(&mut self) -> Result<RrStatus, XfrError> {
        if self.is_exhausted() {
            return Ok(RrStatus::NoMore);
        }
        self.state = 0;
        self.result = None;
        let mut status = self.components[0].first()?;
        while !status.is_ready() && self.state < 2 {
            self.state += 1;
            status = self.components[self.state].first()?;
        }
        self.result = Some(status);
        Ok(status)
    }

    pub fn next(&mut self) -> Result<RrStatus, XfrError> {
        match self.result {
            Some(RrStatus::Ready) => {}
            Some(RrStatus::NoMore) => return Ok(RrStatus::NoMore),
            None => return Err(XfrError::Internal("stream not started")),
        }
        self.result = None;
        let mut status = self.components[self.state].next()?;
        while !status.is_ready() && self.state < 2 {
            self.state += 1;
            status = self.components[self.state].first()?;
        }
        self.result = Some(status);
        Ok(status)
    }

    fn is_exhausted(&self) -> bool {
        self.state == 2 && self.result == Some(RrStatus::NoMore)
    }

    pub fn current(&self) -> Option<&Record> {
        match self.result {
            Some(RrStatus::Ready) => self.components[self.state].current(),
            _ => None,
        }
    }
}
