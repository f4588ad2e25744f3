//! Composing and parsing DNS messages.
//!
//! The [`MessageRenderer`] assembles a response message into a caller
//! provided buffer while enforcing a size limit, compressing owner names as
//! it goes. [`ParsedMessage`] is the reverse: it takes a complete message
//! and decompresses it into its header and sections.

use core::fmt;
use std::collections::HashMap;

use bytes::Bytes;
use tracing::trace;

use super::iana::{Class, Opcode, Rcode, Rtype};
use super::name::{Name, NameError, MAX_NAME_LEN};
use super::record::{Record, RecordData, RR_HEADER_LEN};

/// The size of the message header.
pub const HEADER_LEN: usize = 12;

/// Compression pointers can only reach this far into a message.
const MAX_POINTER_TARGET: usize = 0x3FFF;

//------------ Header --------------------------------------------------------

/// The fixed header of a DNS message, without the section counts.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Header {
    id: u16,
    flags: u16,
}

impl Header {
    const QR: u16 = 0x8000;
    const AA: u16 = 0x0400;
    const TC: u16 = 0x0200;
    const RD: u16 = 0x0100;
    const RA: u16 = 0x0080;

    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a header for a response to the given request header.
    ///
    /// The ID, opcode, and RD flag are copied, QR is set.
    pub fn response_to(request: &Header) -> Self {
        let mut res = Self::new();
        res.set_id(request.id());
        res.set_opcode(request.opcode());
        res.set_rd(request.rd());
        res.set_qr(true);
        res
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn set_id(&mut self, id: u16) {
        self.id = id
    }

    pub fn opcode(&self) -> Opcode {
        Opcode::from_int(((self.flags >> 11) & 0x0F) as u8)
    }

    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.flags = (self.flags & !0x7800)
            | ((u16::from(opcode.to_int()) & 0x0F) << 11);
    }

    pub fn rcode(&self) -> Rcode {
        Rcode::from_int((self.flags & 0x0F) as u8)
    }

    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.flags = (self.flags & !0x0F) | (u16::from(rcode.to_int()) & 0x0F);
    }

    pub fn qr(&self) -> bool {
        self.flag(Self::QR)
    }

    pub fn set_qr(&mut self, value: bool) {
        self.set_flag(Self::QR, value)
    }

    pub fn aa(&self) -> bool {
        self.flag(Self::AA)
    }

    pub fn set_aa(&mut self, value: bool) {
        self.set_flag(Self::AA, value)
    }

    pub fn tc(&self) -> bool {
        self.flag(Self::TC)
    }

    pub fn set_tc(&mut self, value: bool) {
        self.set_flag(Self::TC, value)
    }

    pub fn rd(&self) -> bool {
        self.flag(Self::RD)
    }

    pub fn set_rd(&mut self, value: bool) {
        self.set_flag(Self::RD, value)
    }

    pub fn ra(&self) -> bool {
        self.flag(Self::RA)
    }

    pub fn set_ra(&mut self, value: bool) {
        self.set_flag(Self::RA, value)
    }

    fn flag(&self, bit: u16) -> bool {
        self.flags & bit != 0
    }

    fn set_flag(&mut self, bit: u16, value: bool) {
        if value {
            self.flags |= bit
        } else {
            self.flags &= !bit
        }
    }

    fn to_bytes(self) -> [u8; 4] {
        let id = self.id.to_be_bytes();
        let flags = self.flags.to_be_bytes();
        [id[0], id[1], flags[0], flags[1]]
    }
}

//------------ MessageRenderer -----------------------------------------------

/// Renders a message into a buffer.
///
/// The message starts at the current end of the buffer, so a caller can
/// put a stream length prefix in front of it. Sections must be filled in
/// order: questions before answers. With nothing else ever pushed, the
/// answer section is the last one written.
///
/// A push that would take the message over its limit fails with
/// [`CapacityExceeded`] and leaves the message unchanged.
///
/// Owner names are only compressed against earlier names with the exact
/// same octets, so their case is kept.
pub struct MessageRenderer<'a> {
    target: &'a mut Vec<u8>,
    start: usize,
    limit: usize,
    names: HashMap<Vec<u8>, u16>,
    qdcount: u16,
    ancount: u16,
}

impl<'a> MessageRenderer<'a> {
    /// Starts a message with the given header at the end of `target`.
    pub fn new(
        target: &'a mut Vec<u8>,
        header: Header,
        limit: usize,
    ) -> Result<Self, CapacityExceeded> {
        if limit < HEADER_LEN {
            return Err(CapacityExceeded);
        }
        let start = target.len();
        target.extend_from_slice(&header.to_bytes());
        target.extend_from_slice(&[0; HEADER_LEN - 4]);
        Ok(Self {
            target,
            start,
            limit,
            names: HashMap::new(),
            qdcount: 0,
            ancount: 0,
        })
    }

    /// Returns the current length of the message.
    pub fn len(&self) -> usize {
        self.target.len() - self.start
    }

    /// Returns whether nothing but the header has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == HEADER_LEN
    }

    pub fn push_question(
        &mut self,
        qname: &Name,
        qtype: Rtype,
        qclass: Class,
    ) -> Result<(), CapacityExceeded> {
        if self.ancount > 0 {
            return Err(CapacityExceeded);
        }
        let (prefix, pointer) = self.find_suffix(qname.as_slice());
        let needed = name_size(prefix, pointer) + 4;
        self.check_space(needed)?;
        self.put_name(qname.as_slice(), prefix, pointer);
        self.target.extend_from_slice(&qtype.to_int().to_be_bytes());
        self.target.extend_from_slice(&qclass.to_int().to_be_bytes());
        self.qdcount += 1;
        Ok(())
    }

    pub fn push_answer(
        &mut self,
        record: &Record,
    ) -> Result<(), CapacityExceeded> {
        if record.data().len() > usize::from(u16::MAX) {
            return Err(CapacityExceeded);
        }
        let mut fixed = [0u8; RR_HEADER_LEN];
        fixed[..2].copy_from_slice(&record.rtype().to_int().to_be_bytes());
        fixed[2..4].copy_from_slice(&record.class().to_int().to_be_bytes());
        fixed[4..8].copy_from_slice(&record.ttl().to_be_bytes());
        fixed[8..].copy_from_slice(&(record.data().len() as u16).to_be_bytes());
        self.push_answer_parts(
            record.owner().as_slice(),
            &fixed,
            record.data().as_slice(),
        )
    }

    /// Appends an answer given in uncompressed wire format.
    ///
    /// `owner` is the owner name, `rest` everything following it, i.e.,
    /// type, class, TTL, data length, and data. Both must be well-formed,
    /// as produced by [`Record::compose`].
    pub fn push_raw_answer(
        &mut self,
        owner: &[u8],
        rest: &[u8],
    ) -> Result<(), CapacityExceeded> {
        self.push_answer_parts(owner, rest, &[])
    }

    fn push_answer_parts(
        &mut self,
        owner: &[u8],
        fixed: &[u8],
        data: &[u8],
    ) -> Result<(), CapacityExceeded> {
        if self.ancount == u16::MAX {
            return Err(CapacityExceeded);
        }
        let (prefix, pointer) = self.find_suffix(owner);
        let needed = name_size(prefix, pointer) + fixed.len() + data.len();
        self.check_space(needed)?;
        self.put_name(owner, prefix, pointer);
        self.target.extend_from_slice(fixed);
        self.target.extend_from_slice(data);
        self.ancount += 1;
        Ok(())
    }

    /// Completes the message, writing the section counts.
    ///
    /// Returns the length of the message.
    pub fn finish(self) -> usize {
        let counts = &mut self.target[self.start + 4..self.start + 8];
        counts[..2].copy_from_slice(&self.qdcount.to_be_bytes());
        counts[2..].copy_from_slice(&self.ancount.to_be_bytes());
        trace!(
            "Rendered message: qdcount={}, ancount={}, {} bytes",
            self.qdcount,
            self.ancount,
            self.target.len() - self.start
        );
        self.target.len() - self.start
    }

    fn check_space(&self, needed: usize) -> Result<(), CapacityExceeded> {
        if self.len() + needed > self.limit {
            Err(CapacityExceeded)
        } else {
            Ok(())
        }
    }

    /// Finds the longest suffix of `name` already present in the message.
    ///
    /// Returns the length of the prefix to write literally and the offset
    /// to point to, if any.
    fn find_suffix(&self, octets: &[u8]) -> (usize, Option<u16>) {
        let mut pos = 0;
        while octets[pos] != 0 {
            if let Some(&offset) = self.names.get(&octets[pos..]) {
                return (pos, Some(offset));
            }
            pos += 1 + usize::from(octets[pos]);
        }
        (octets.len(), None)
    }

    fn put_name(&mut self, octets: &[u8], prefix: usize, pointer: Option<u16>) {
        let mut pos = 0;
        while pos < prefix && octets[pos] != 0 {
            let offset = self.len();
            if offset <= MAX_POINTER_TARGET {
                self.names
                    .entry(octets[pos..].to_vec())
                    .or_insert(offset as u16);
            }
            let end = pos + 1 + usize::from(octets[pos]);
            self.target.extend_from_slice(&octets[pos..end]);
            pos = end;
        }
        match pointer {
            Some(offset) => {
                self.target
                    .extend_from_slice(&(0xC000 | offset).to_be_bytes());
            }
            None => self.target.push(0),
        }
    }
}

fn name_size(prefix: usize, pointer: Option<u16>) -> usize {
    match pointer {
        Some(_) => prefix + 2,
        // Uncompressed, the prefix is the whole name.
        None => prefix,
    }
}

//------------ ParsedMessage -------------------------------------------------

/// A question from the question section of a message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Question {
    qname: Name,
    qtype: Rtype,
    qclass: Class,
}

impl Question {
    pub fn new(qname: Name, qtype: Rtype, qclass: Class) -> Self {
        Self {
            qname,
            qtype,
            qclass,
        }
    }

    pub fn qname(&self) -> &Name {
        &self.qname
    }

    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    pub fn qclass(&self) -> Class {
        self.qclass
    }
}

/// A message taken apart into its header and sections.
///
/// Owner names are decompressed. Record data is taken as is, which is
/// correct for everything [`MessageRenderer`] produces since it never
/// compresses names inside record data.
#[derive(Clone, Debug)]
pub struct ParsedMessage {
    header: Header,
    question: Vec<Question>,
    answer: Vec<Record>,
    authority: Vec<Record>,
    additional: Vec<Record>,
}

impl ParsedMessage {
    pub fn parse(octets: &[u8]) -> Result<Self, ParseError> {
        if octets.len() < HEADER_LEN {
            return Err(ParseError::ShortInput);
        }
        let header = Header {
            id: u16::from_be_bytes([octets[0], octets[1]]),
            flags: u16::from_be_bytes([octets[2], octets[3]]),
        };
        let count = |idx: usize| {
            usize::from(u16::from_be_bytes([
                octets[4 + idx * 2],
                octets[5 + idx * 2],
            ]))
        };
        let mut parser = Parser { octets, pos: HEADER_LEN };

        let mut question = Vec::with_capacity(count(0));
        for _ in 0..count(0) {
            let qname = parser.name()?;
            let qtype = Rtype::from_int(parser.u16()?);
            let qclass = Class::from_int(parser.u16()?);
            question.push(Question::new(qname, qtype, qclass));
        }
        let answer = parser.records(count(1))?;
        let authority = parser.records(count(2))?;
        let additional = parser.records(count(3))?;
        if parser.pos != octets.len() {
            return Err(ParseError::Form("trailing data after message"));
        }
        Ok(Self {
            header,
            question,
            answer,
            authority,
            additional,
        })
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn question(&self) -> &[Question] {
        &self.question
    }

    pub fn answer(&self) -> &[Record] {
        &self.answer
    }

    pub fn authority(&self) -> &[Record] {
        &self.authority
    }

    pub fn additional(&self) -> &[Record] {
        &self.additional
    }

    pub fn into_answer(self) -> Vec<Record> {
        self.answer
    }
}

//------------ Parser --------------------------------------------------------

struct Parser<'a> {
    octets: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn take(&mut self, len: usize) -> Result<&[u8], ParseError> {
        let end = self.pos.checked_add(len).ok_or(ParseError::ShortInput)?;
        let res = self
            .octets
            .get(self.pos..end)
            .ok_or(ParseError::ShortInput)?;
        self.pos = end;
        Ok(res)
    }

    fn u16(&mut self) -> Result<u16, ParseError> {
        let slice = self.take(2)?;
        Ok(u16::from_be_bytes([slice[0], slice[1]]))
    }

    fn u32(&mut self) -> Result<u32, ParseError> {
        let slice = self.take(4)?;
        Ok(u32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
    }

    fn name(&mut self) -> Result<Name, ParseError> {
        let mut res = Vec::with_capacity(MAX_NAME_LEN);
        let mut pos = self.pos;
        let mut end = None;
        // Every pointer must point backwards, so this terminates.
        let mut limit = pos;
        loop {
            let len = *self.octets.get(pos).ok_or(ParseError::ShortInput)?;
            match len & 0xC0 {
                0xC0 => {
                    let low =
                        *self.octets.get(pos + 1).ok_or(ParseError::ShortInput)?;
                    let target =
                        usize::from(u16::from_be_bytes([len & 0x3F, low]));
                    if target >= limit {
                        return Err(ParseError::BadPointer);
                    }
                    if end.is_none() {
                        end = Some(pos + 2);
                    }
                    limit = target;
                    pos = target;
                }
                0x00 => {
                    let len = usize::from(len);
                    let label = self
                        .octets
                        .get(pos..pos + 1 + len)
                        .ok_or(ParseError::ShortInput)?;
                    res.extend_from_slice(label);
                    if res.len() > MAX_NAME_LEN {
                        return Err(ParseError::Name(NameError::LongName));
                    }
                    pos += 1 + len;
                    if len == 0 {
                        break;
                    }
                }
                _ => return Err(ParseError::Name(NameError::BadLabel)),
            }
        }
        self.pos = end.unwrap_or(pos);
        Ok(Name::from_octets(res.into())?)
    }

    fn records(&mut self, count: usize) -> Result<Vec<Record>, ParseError> {
        let mut res = Vec::with_capacity(count);
        for _ in 0..count {
            let owner = self.name()?;
            let rtype = Rtype::from_int(self.u16()?);
            let class = Class::from_int(self.u16()?);
            let ttl = self.u32()?;
            let rdlen = usize::from(self.u16()?);
            let data = Bytes::copy_from_slice(self.take(rdlen)?);
            res.push(Record::new(
                owner,
                class,
                ttl,
                RecordData::new(rtype, data),
            ));
        }
        Ok(res)
    }
}

//============ Error Types ===================================================

//------------ CapacityExceeded ----------------------------------------------

/// A message did not have enough room left.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CapacityExceeded;

impl fmt::Display for CapacityExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("message size limit exceeded")
    }
}

impl std::error::Error for CapacityExceeded {}

//------------ ParseError ----------------------------------------------------

/// Wire format data could not be parsed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The data ended too early.
    ShortInput,

    /// A compression pointer pointed forward or at itself.
    BadPointer,

    /// Record data is longer than 65535 octets.
    LongRecordData,

    /// An embedded domain name was invalid.
    Name(NameError),

    /// The data was otherwise malformed.
    Form(&'static str),
}

impl From<NameError> for ParseError {
    fn from(err: NameError) -> Self {
        Self::Name(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ShortInput => f.write_str("unexpected end of input"),
            ParseError::BadPointer => f.write_str("invalid compression pointer"),
            ParseError::LongRecordData => f.write_str("long record data"),
            ParseError::Name(err) => err.fmt(f),
            ParseError::Form(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ParseError {}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use core::str::FromStr;
    use std::net::Ipv4Addr;

    use super::*;

    fn n(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    fn a(owner: &str) -> Record {
        Record::new(
            n(owner),
            Class::IN,
            300,
            RecordData::a(Ipv4Addr::new(192, 0, 2, 1)),
        )
    }

    #[test]
    fn compresses_owner_names() {
        let mut buf = Vec::new();
        let mut header = Header::new();
        header.set_id(0x1234);
        header.set_qr(true);
        header.set_aa(true);
        let mut msg = MessageRenderer::new(&mut buf, header, 512).unwrap();
        msg.push_question(&n("example.com"), Rtype::AXFR, Class::IN)
            .unwrap();
        msg.push_answer(&a("example.com")).unwrap();
        msg.push_answer(&a("www.EXAMPLE.com")).unwrap();
        let len = msg.finish();
        assert_eq!(len, buf.len());

        // Question: 13 + 4. First answer: pointer 2 + 10 + 4.
        // Second answer: "www" and "EXAMPLE" labels 12, pointer to "com"
        // 2, then 10 + 4.
        assert_eq!(len, HEADER_LEN + 17 + 16 + 28);

        let parsed = ParsedMessage::parse(&buf).unwrap();
        assert_eq!(parsed.header().id(), 0x1234);
        assert!(parsed.header().qr() && parsed.header().aa());
        assert_eq!(parsed.question()[0].qtype(), Rtype::AXFR);
        assert_eq!(parsed.answer(), &[a("example.com"), a("www.example.com")]);
        assert_eq!(
            parsed.answer()[1].owner().as_slice(),
            n("www.EXAMPLE.com").as_slice()
        );
    }

    #[test]
    fn limit_is_enforced_without_side_effects() {
        let mut buf = Vec::new();
        let limit = HEADER_LEN + 25 + 16;
        let mut msg =
            MessageRenderer::new(&mut buf, Header::new(), limit).unwrap();
        msg.push_answer(&a("a.example")).unwrap();
        assert_eq!(msg.len(), HEADER_LEN + 25);
        assert_eq!(msg.push_answer(&a("b.example")), Err(CapacityExceeded));
        assert_eq!(msg.len(), HEADER_LEN + 25);
        // Fully compressed, the same owner fits.
        msg.push_answer(&a("a.example")).unwrap();
        assert_eq!(msg.len(), HEADER_LEN + 25 + 16);
        let _ = msg.finish();
    }

    #[test]
    fn raw_answers_are_compressed() {
        let record = a("www.example.com");
        let mut raw = Vec::new();
        record.compose(&mut raw);
        let (owner, rest) = raw.split_at(record.owner().len());

        let mut buf = Vec::new();
        let mut msg = MessageRenderer::new(&mut buf, Header::new(), 512).unwrap();
        msg.push_raw_answer(owner, rest).unwrap();
        msg.push_raw_answer(owner, rest).unwrap();
        assert_eq!(msg.finish(), HEADER_LEN + raw.len() + 16);
        assert_eq!(
            ParsedMessage::parse(&buf).unwrap().into_answer(),
            [record.clone(), record]
        );
    }

    #[test]
    fn message_after_prefix() {
        let mut buf = vec![0, 0];
        let msg = MessageRenderer::new(&mut buf, Header::new(), 512).unwrap();
        assert_eq!(msg.finish(), HEADER_LEN);
        assert_eq!(buf.len(), 2 + HEADER_LEN);
    }

    #[test]
    fn header_flags() {
        let mut request = Header::new();
        request.set_id(7);
        request.set_rd(true);
        let mut response = Header::response_to(&request);
        response.set_rcode(Rcode::NOTAUTH);
        assert_eq!(response.id(), 7);
        assert!(response.qr() && response.rd() && !response.aa());
        assert_eq!(response.rcode(), Rcode::NOTAUTH);
        assert_eq!(response.opcode(), Opcode::QUERY);
    }

    #[test]
    fn rejects_forward_pointers() {
        let mut buf = vec![0; HEADER_LEN];
        buf[5] = 1;
        buf.extend_from_slice(&[0xC0, 0x0C, 0, 1, 0, 1]);
        assert_eq!(
            ParsedMessage::parse(&buf).unwrap_err(),
            ParseError::BadPointer
        );
    }
}
