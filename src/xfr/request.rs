//! Accepted transfer requests.

use std::net::SocketAddr;

use crate::base::iana::{Class, Rcode, Rtype};
use crate::base::name::Name;
use crate::base::record::Record;
use crate::base::wire::{
    CapacityExceeded, Header, MessageRenderer, ParsedMessage, Question,
};

use super::tsig::SigningContext;

//------------ TransportKind -------------------------------------------------

/// The kind of transport a request arrived over.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportKind {
    /// A connection-oriented transport such as TCP.
    ///
    /// Messages are preceded by their length as a 16 bit integer.
    Stream,

    /// A connectionless transport such as UDP.
    ///
    /// The response has to fit into a single message.
    Datagram,
}

impl TransportKind {
    pub fn is_datagram(self) -> bool {
        matches!(self, TransportKind::Datagram)
    }
}

//------------ XfrRequest ----------------------------------------------------

/// A transfer request that has passed admission.
///
/// Parsing the request, checking access control, and verifying its
/// signature happen before a request gets here. If the request was signed,
/// it carries the [`SigningContext`] for signing the response.
#[derive(Debug)]
pub struct XfrRequest {
    header: Header,
    questions: Vec<Question>,
    authority: Vec<Record>,
    transport: TransportKind,
    signing: Option<SigningContext>,
    client: Option<SocketAddr>,
}

impl XfrRequest {
    /// Creates a request with a single question.
    pub fn new(
        id: u16,
        qname: Name,
        qtype: Rtype,
        qclass: Class,
        transport: TransportKind,
    ) -> Self {
        let mut header = Header::new();
        header.set_id(id);
        Self {
            header,
            questions: vec![Question::new(qname, qtype, qclass)],
            authority: Vec::new(),
            transport,
            signing: None,
            client: None,
        }
    }

    /// Creates a request from a parsed message.
    pub fn from_message(msg: &ParsedMessage, transport: TransportKind) -> Self {
        Self {
            header: msg.header(),
            questions: msg.question().to_vec(),
            authority: msg.authority().to_vec(),
            transport,
            signing: None,
            client: None,
        }
    }

    /// Adds a record to the authority section.
    ///
    /// IXFR requests carry the client's SOA here.
    pub fn push_authority(&mut self, record: Record) {
        self.authority.push(record)
    }

    pub fn set_rd(&mut self, rd: bool) {
        self.header.set_rd(rd)
    }

    #[must_use]
    pub fn with_signing(mut self, signing: SigningContext) -> Self {
        self.signing = Some(signing);
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: SocketAddr) -> Self {
        self.client = Some(client);
        self
    }

    pub fn id(&self) -> u16 {
        self.header.id()
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn authority(&self) -> &[Record] {
        &self.authority
    }

    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    pub fn signing(&self) -> Option<&SigningContext> {
        self.signing.as_ref()
    }

    pub fn take_signing(&mut self) -> Option<SigningContext> {
        self.signing.take()
    }

    pub fn client(&self) -> Option<SocketAddr> {
        self.client
    }

    /// Returns a printable client address for logging.
    pub(crate) fn client_display(&self) -> String {
        match self.client {
            Some(addr) => addr.to_string(),
            None => "unknown client".into(),
        }
    }
}

//------------ render_error_response -----------------------------------------

/// Renders an error response to a request.
///
/// The response echoes the ID, RD flag, and the first question of the
/// request and has no records.
pub fn render_error_response(
    header: &Header,
    question: Option<&Question>,
    rcode: Rcode,
) -> Result<Vec<u8>, CapacityExceeded> {
    let mut res = Vec::new();
    let mut response = Header::response_to(header);
    response.set_rcode(rcode);
    let mut msg = MessageRenderer::new(&mut res, response, usize::from(u16::MAX))?;
    if let Some(question) = question {
        msg.push_question(question.qname(), question.qtype(), question.qclass())?;
    }
    msg.finish();
    Ok(res)
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::*;

    #[test]
    fn error_response_echoes_request() {
        let mut req = XfrRequest::new(
            0xbeef,
            Name::from_str("example.com").unwrap(),
            Rtype::AXFR,
            Class::IN,
            TransportKind::Stream,
        );
        req.set_rd(true);
        let wire = render_error_response(
            &req.header(),
            req.questions().first(),
            Rcode::NOTAUTH,
        )
        .unwrap();
        let parsed = ParsedMessage::parse(&wire).unwrap();
        let header = parsed.header();
        assert_eq!(header.id(), 0xbeef);
        assert!(header.qr() && header.rd() && !header.aa());
        assert_eq!(header.rcode(), Rcode::NOTAUTH);
        assert_eq!(parsed.question(), req.questions());
        assert!(parsed.answer().is_empty());
    }
}
