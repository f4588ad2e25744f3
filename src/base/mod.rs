//! Basic DNS data.
//!
//! Zone transfers only need a small part of DNS: absolute domain names,
//! records with opaque data, serial numbers, and a way to put records into
//! messages. This module provides these, leaving the interpretation of
//! record data to the consumers.
//!
//! * [name] for absolute domain names in wire format,
//! * [record] for resource records and the SOA record data,
//! * [serial] for RFC 1982 serial numbers,
//! * [wire] for composing and parsing messages,
//! * [iana] for the registered codes used along the way.

pub use self::iana::{Class, Opcode, Rcode, Rtype};
pub use self::name::{Name, NameError};
pub use self::record::{Record, RecordData, RrStatus, Soa};
pub use self::serial::Serial;
pub use self::wire::{
    CapacityExceeded, Header, MessageRenderer, ParseError, ParsedMessage,
    Question,
};

pub mod iana;
pub mod name;
pub mod record;
pub mod serial;
pub mod wire;
