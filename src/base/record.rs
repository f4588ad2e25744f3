//! Resource records.
//!
//! Zone transfers move records around without looking inside them, so the
//! record data is kept as opaque uncompressed wire format tagged with its
//! type. The only record data the crate interprets is the SOA, for its
//! serial number.

use core::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::{BufMut, Bytes, BytesMut};

use super::iana::{Class, Rtype};
use super::name::Name;
use super::serial::Serial;
use super::wire::ParseError;

/// The size of the fixed part of a record: type, class, TTL, and length.
pub const RR_HEADER_LEN: usize = 10;

//------------ RrStatus ------------------------------------------------------

/// The outcome of moving a record cursor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RrStatus {
    /// The cursor is positioned on a record.
    Ready,

    /// There are no more records.
    NoMore,
}

impl RrStatus {
    pub fn is_ready(self) -> bool {
        matches!(self, RrStatus::Ready)
    }
}

//------------ RecordData ----------------------------------------------------

/// The data of a resource record in uncompressed wire format.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct RecordData {
    rtype: Rtype,
    octets: Bytes,
}

impl RecordData {
    pub fn new(rtype: Rtype, octets: impl Into<Bytes>) -> Self {
        Self {
            rtype,
            octets: octets.into(),
        }
    }

    pub fn a(addr: Ipv4Addr) -> Self {
        Self::new(Rtype::A, Bytes::copy_from_slice(&addr.octets()))
    }

    pub fn aaaa(addr: Ipv6Addr) -> Self {
        Self::new(Rtype::AAAA, Bytes::copy_from_slice(&addr.octets()))
    }

    pub fn ns(nsdname: &Name) -> Self {
        Self::new(Rtype::NS, nsdname.as_octets().clone())
    }

    pub fn cname(target: &Name) -> Self {
        Self::new(Rtype::CNAME, target.as_octets().clone())
    }

    pub fn mx(preference: u16, exchange: &Name) -> Self {
        let mut buf = BytesMut::with_capacity(2 + exchange.len());
        buf.put_u16(preference);
        buf.put_slice(exchange.as_slice());
        Self::new(Rtype::MX, buf.freeze())
    }

    /// Creates TXT record data with a single character string.
    ///
    /// Text longer than 255 octets is split over multiple strings.
    pub fn txt(text: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(text.len() + text.len() / 255 + 1);
        if text.is_empty() {
            buf.put_u8(0);
        }
        for chunk in text.chunks(255) {
            buf.put_u8(chunk.len() as u8);
            buf.put_slice(chunk);
        }
        Self::new(Rtype::TXT, buf.freeze())
    }

    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    pub fn octets(&self) -> &Bytes {
        &self.octets
    }

    pub fn as_slice(&self) -> &[u8] {
        self.octets.as_ref()
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.octets.len()
    }
}

//--- Debug

impl fmt::Debug for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \\# {}", self.rtype, self.octets.len())?;
        for ch in self.octets.iter() {
            write!(f, " {ch:02x}")?;
        }
        Ok(())
    }
}

//------------ Record --------------------------------------------------------

/// A resource record: owner, class, TTL, and typed data.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Record {
    owner: Name,
    class: Class,
    ttl: u32,
    data: RecordData,
}

impl Record {
    pub fn new(owner: Name, class: Class, ttl: u32, data: RecordData) -> Self {
        Self {
            owner,
            class,
            ttl,
            data,
        }
    }

    pub fn owner(&self) -> &Name {
        &self.owner
    }

    pub fn class(&self) -> Class {
        self.class
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn rtype(&self) -> Rtype {
        self.data.rtype()
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn into_data(self) -> RecordData {
        self.data
    }

    /// Returns the size of the record in uncompressed wire format.
    pub fn wire_len(&self) -> usize {
        self.owner.len() + RR_HEADER_LEN + self.data.len()
    }

    /// Appends the record in uncompressed wire format to `target`.
    pub fn compose(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(self.owner.as_slice());
        target.extend_from_slice(&self.rtype().to_int().to_be_bytes());
        target.extend_from_slice(&self.class.to_int().to_be_bytes());
        target.extend_from_slice(&self.ttl.to_be_bytes());
        // Record data is never longer than 65535 octets, see Record::check.
        target.extend_from_slice(&(self.data.len() as u16).to_be_bytes());
        target.extend_from_slice(self.data.as_slice());
    }

    /// Returns whether the record is an SOA record.
    pub fn is_soa(&self) -> bool {
        self.rtype() == Rtype::SOA
    }

    /// Returns the serial if this is an SOA record.
    pub fn soa_serial(&self) -> Option<Serial> {
        if !self.is_soa() {
            return None;
        }
        Soa::from_record_data(&self.data).ok().map(|soa| soa.serial())
    }

    /// Checks that the record data fits into a record.
    pub fn check(&self) -> Result<(), ParseError> {
        if self.data.len() > usize::from(u16::MAX) {
            return Err(ParseError::LongRecordData);
        }
        Ok(())
    }
}

//--- Display

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {:?}",
            self.owner, self.ttl, self.class, self.data
        )
    }
}

//------------ Soa -----------------------------------------------------------

/// The fields of SOA record data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Soa {
    mname: Name,
    rname: Name,
    serial: Serial,
    refresh: u32,
    retry: u32,
    expire: u32,
    minimum: u32,
}

impl Soa {
    pub fn new(
        mname: Name,
        rname: Name,
        serial: Serial,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    ) -> Self {
        Self {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        }
    }

    /// Parses SOA record data.
    ///
    /// The embedded names must be uncompressed.
    pub fn from_record_data(data: &RecordData) -> Result<Self, ParseError> {
        if data.rtype() != Rtype::SOA {
            return Err(ParseError::Form("not SOA record data"));
        }
        let octets = data.as_slice();
        let (mname, pos) = take_name(octets, 0)?;
        let (rname, pos) = take_name(octets, pos)?;
        let fields = octets.get(pos..).ok_or(ParseError::ShortInput)?;
        if fields.len() != 20 {
            return Err(ParseError::Form("bad SOA record data length"));
        }
        let field = |idx: usize| {
            u32::from_be_bytes([
                fields[idx * 4],
                fields[idx * 4 + 1],
                fields[idx * 4 + 2],
                fields[idx * 4 + 3],
            ])
        };
        Ok(Self {
            mname,
            rname,
            serial: field(0).into(),
            refresh: field(1),
            retry: field(2),
            expire: field(3),
            minimum: field(4),
        })
    }

    pub fn to_record_data(&self) -> RecordData {
        let mut buf =
            BytesMut::with_capacity(self.mname.len() + self.rname.len() + 20);
        buf.put_slice(self.mname.as_slice());
        buf.put_slice(self.rname.as_slice());
        buf.put_u32(self.serial.into());
        buf.put_u32(self.refresh);
        buf.put_u32(self.retry);
        buf.put_u32(self.expire);
        buf.put_u32(self.minimum);
        RecordData::new(Rtype::SOA, buf.freeze())
    }

    pub fn mname(&self) -> &Name {
        &self.mname
    }

    pub fn rname(&self) -> &Name {
        &self.rname
    }

    pub fn serial(&self) -> Serial {
        self.serial
    }

    pub fn refresh(&self) -> u32 {
        self.refresh
    }

    pub fn retry(&self) -> u32 {
        self.retry
    }

    pub fn expire(&self) -> u32 {
        self.expire
    }

    pub fn minimum(&self) -> u32 {
        self.minimum
    }

    /// Returns a copy with the serial replaced.
    #[must_use]
    pub fn with_serial(&self, serial: Serial) -> Self {
        Self {
            serial,
            ..self.clone()
        }
    }
}

fn take_name(octets: &[u8], start: usize) -> Result<(Name, usize), ParseError> {
    let mut pos = start;
    loop {
        let len = usize::from(*octets.get(pos).ok_or(ParseError::ShortInput)?);
        if len & 0xC0 != 0 {
            return Err(ParseError::Form("compressed name in record data"));
        }
        pos += 1 + len;
        if len == 0 {
            break;
        }
    }
    let slice = octets.get(start..pos).ok_or(ParseError::ShortInput)?;
    Ok((Name::from_slice(slice)?, pos))
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::*;

    #[test]
    fn soa_roundtrip_and_serial() {
        let soa = Soa::new(
            Name::from_str("ns.example.com").unwrap(),
            Name::from_str("hostmaster.example.com").unwrap(),
            Serial::from(2024010101),
            3600,
            600,
            86400,
            300,
        );
        let record = Record::new(
            Name::from_str("example.com").unwrap(),
            Class::IN,
            3600,
            soa.to_record_data(),
        );
        assert_eq!(record.soa_serial(), Some(Serial::from(2024010101)));
        assert_eq!(Soa::from_record_data(record.data()).unwrap(), soa);
        assert_eq!(
            soa.with_serial(7.into()).serial(),
            Serial::from(7)
        );
    }

    #[test]
    fn compose_uncompressed() {
        let record = Record::new(
            Name::from_str("a.b").unwrap(),
            Class::IN,
            60,
            RecordData::a(Ipv4Addr::new(192, 0, 2, 1)),
        );
        let mut buf = Vec::new();
        record.compose(&mut buf);
        assert_eq!(buf.len(), record.wire_len());
        assert_eq!(
            buf,
            b"\x01a\x01b\x00\x00\x01\x00\x01\x00\x00\x00\x3c\x00\x04\xc0\x00\x02\x01"
        );
        assert_eq!(record.soa_serial(), None);
    }

    #[test]
    fn txt_splits_long_text() {
        let data = RecordData::txt(&[b'x'; 300]);
        assert_eq!(data.len(), 302);
        assert_eq!(data.as_slice()[0], 255);
        assert_eq!(data.as_slice()[256], 45);
    }
}
