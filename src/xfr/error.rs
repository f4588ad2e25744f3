//! Zone transfer errors.

use core::fmt;
use std::collections::TryReserveError;
use std::io;

use crate::base::iana::Rcode;
use crate::base::wire::CapacityExceeded;
use crate::journal::JournalError;
use crate::zonetree::StoreError;

use super::tsig::SignError;

//------------ XfrError ------------------------------------------------------

/// A zone transfer could not be started or completed.
#[derive(Debug)]
pub enum XfrError {
    /// The request is malformed.
    FormatError(&'static str),

    /// We are not authoritative for the requested zone.
    NotAuthoritative,

    /// The journal doesn't have the history an incremental transfer needs.
    ///
    /// This is resolved by falling back to a full transfer and never ends
    /// a transfer by itself.
    HistoryUnavailable(JournalError),

    /// A record of the given size does not fit into an empty message.
    RecordTooLarge(usize),

    /// Memory for the transfer buffers could not be allocated.
    AllocationFailure,

    /// Sending a message failed.
    TransportFailure(io::Error),

    /// Reading the zone failed.
    Store(StoreError),

    /// Reading the journal failed.
    Journal(JournalError),

    /// Signing a message failed.
    Signing(SignError),

    /// Something that should not happen, happened.
    Internal(&'static str),
}

impl XfrError {
    /// Returns the response code to answer the request with.
    ///
    /// Returns `None` if no response can be sent anymore because the
    /// transport failed.
    pub fn rcode(&self) -> Option<Rcode> {
        match self {
            XfrError::FormatError(_) => Some(Rcode::FORMERR),
            XfrError::NotAuthoritative => Some(Rcode::NOTAUTH),
            XfrError::TransportFailure(_) => None,
            _ => Some(Rcode::SERVFAIL),
        }
    }

    /// Returns whether a full transfer can be sent instead.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, XfrError::HistoryUnavailable(_))
    }
}

//--- From

impl From<StoreError> for XfrError {
    fn from(err: StoreError) -> Self {
        XfrError::Store(err)
    }
}

impl From<JournalError> for XfrError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::NotFound | JournalError::OutOfRange => {
                XfrError::HistoryUnavailable(err)
            }
            JournalError::Corrupt(_) => XfrError::Journal(err),
        }
    }
}

impl From<SignError> for XfrError {
    fn from(err: SignError) -> Self {
        XfrError::Signing(err)
    }
}

impl From<TryReserveError> for XfrError {
    fn from(_: TryReserveError) -> Self {
        XfrError::AllocationFailure
    }
}

impl From<CapacityExceeded> for XfrError {
    fn from(_: CapacityExceeded) -> Self {
        XfrError::Internal("message exceeds its reserved size")
    }
}

//--- Display and Error

impl fmt::Display for XfrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XfrError::FormatError(msg) => write!(f, "format error: {msg}"),
            XfrError::NotAuthoritative => f.write_str("not authoritative"),
            XfrError::HistoryUnavailable(err) => {
                write!(f, "history unavailable: {err}")
            }
            XfrError::RecordTooLarge(size) => {
                write!(f, "record of {size} bytes too large for message")
            }
            XfrError::AllocationFailure => {
                f.write_str("failed to allocate transfer buffers")
            }
            XfrError::TransportFailure(err) => {
                write!(f, "transport failure: {err}")
            }
            XfrError::Store(err) => err.fmt(f),
            XfrError::Journal(err) => err.fmt(f),
            XfrError::Signing(err) => err.fmt(f),
            XfrError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for XfrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            XfrError::HistoryUnavailable(err) | XfrError::Journal(err) => {
                Some(err)
            }
            XfrError::TransportFailure(err) => Some(err),
            XfrError::Store(err) => Some(err),
            XfrError::Signing(err) => Some(err),
            _ => None,
        }
    }
}
