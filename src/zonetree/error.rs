//! Zone related errors.

use core::fmt;

use crate::base::iana::Class;
use crate::base::name::Name;
use crate::journal::JournalError;

//------------ StoreError ----------------------------------------------------

/// Reading or changing zone content failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// The zone has no SOA record at its apex.
    MissingSoa,

    /// The SOA record data could not be used.
    InvalidSoa,

    /// A name is not at or below the zone apex.
    OutOfZone(Name),

    /// A record is of a different class than the zone.
    ClassMismatch(Class),

    /// The history of changes could not be updated.
    Journal(JournalError),

    /// The backing store failed.
    Backend(String),
}

impl From<JournalError> for StoreError {
    fn from(err: JournalError) -> Self {
        StoreError::Journal(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::MissingSoa => f.write_str("zone has no SOA record"),
            StoreError::InvalidSoa => f.write_str("invalid SOA record"),
            StoreError::OutOfZone(name) => write!(f, "{name} out of zone"),
            StoreError::ClassMismatch(class) => {
                write!(f, "record class {class} does not match zone")
            }
            StoreError::Journal(err) => err.fmt(f),
            StoreError::Backend(msg) => write!(f, "zone store error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

//------------ ZoneTreeModificationError -------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ZoneTreeModificationError {
    ZoneExists,
    ZoneDoesNotExist,
}

impl fmt::Display for ZoneTreeModificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneTreeModificationError::ZoneExists => {
                f.write_str("zone already exists")
            }
            ZoneTreeModificationError::ZoneDoesNotExist => {
                f.write_str("zone does not exist")
            }
        }
    }
}

impl std::error::Error for ZoneTreeModificationError {}
