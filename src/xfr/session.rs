//! Sending a transfer as a sequence of messages.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, trace, warn};

use crate::base::iana::{Opcode, Rcode};
use crate::base::record::RrStatus;
use crate::base::wire::{Header, MessageRenderer, Question, HEADER_LEN};
use crate::zonetree::ZoneSnapshot;

use super::buffer::ScratchBuffer;
use super::config::XfrConfig;
use super::error::XfrError;
use super::request::{TransportKind, XfrRequest};
use super::select::{Selected, XfrKind};
use super::stream::XfrStream;
use super::transport::XfrTransport;
use super::tsig::{SignError, SigningChain};

/// The length of the prefix of messages on stream transports.
const LENGTH_PREFIX_LEN: usize = 2;

//------------ SessionState --------------------------------------------------

/// Where a session is in sending its transfer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    /// Collecting the records of the next message.
    Building,

    /// Waiting for the transport to take a message.
    Sending,

    /// All messages have been sent.
    Done,

    /// The transfer was aborted.
    Failed,
}

//------------ XfrSummary ----------------------------------------------------

/// What a completed transfer sent.
#[derive(Clone, Debug)]
pub struct XfrSummary {
    /// The kind of transfer.
    pub kind: XfrKind,

    /// The number of messages.
    pub messages: usize,

    /// The number of answer records across all messages.
    pub records: usize,

    /// The number of bytes across all messages, without length prefixes.
    pub bytes: usize,

    /// The response message for datagram transports.
    ///
    /// Datagram responses aren't sent by the session but returned here
    /// for the caller to send.
    pub datagram: Option<Bytes>,
}

//------------ XfrSession ----------------------------------------------------

/// A transfer in progress.
///
/// The session owns everything the transfer needs: the zone snapshot, the
/// record stream, and the buffers, all of which are released when the
/// session ends, however it ends.
pub struct XfrSession {
    request: Header,
    question: Option<Question>,
    transport: TransportKind,
    kind: XfrKind,
    snapshot: Arc<dyn ZoneSnapshot>,
    stream: XfrStream,
    signing: Option<SigningChain>,
    one_answer: bool,
    scratch: ScratchBuffer,
    out: Vec<u8>,
    state: SessionState,
    messages: usize,
    records: usize,
    bytes: usize,
}

impl XfrSession {
    /// Creates a session for sending the selected answer to a request.
    ///
    /// Allocates the buffers for the transfer. The space the signer needs
    /// is taken from the configured maximum message size.
    pub fn new(
        mut req: XfrRequest,
        selected: Selected,
        config: &XfrConfig,
    ) -> Result<Self, XfrError> {
        let signing = req.take_signing().map(SigningChain::new);
        let reserved_len = signing.as_ref().map_or(0, SigningChain::reserved_len);
        let max_size = config.max_message_size();
        let capacity = max_size
            .checked_sub(reserved_len)
            .filter(|capacity| *capacity > HEADER_LEN)
            .ok_or(SignError::new("signature doesn't fit into a message"))?;
        let scratch = ScratchBuffer::with_capacity(capacity)?;
        let mut out = Vec::new();
        out.try_reserve_exact(max_size + LENGTH_PREFIX_LEN)?;

        let (kind, snapshot, stream) = selected.into_parts();
        Ok(Self {
            request: req.header(),
            question: req.questions().first().cloned(),
            transport: req.transport(),
            kind,
            snapshot,
            stream,
            signing,
            one_answer: config.one_answer(),
            scratch,
            out,
            state: SessionState::Building,
            messages: 0,
            records: 0,
            bytes: 0,
        })
    }

    pub fn kind(&self) -> XfrKind {
        self.kind
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Sends the transfer.
    ///
    /// For stream transports, sends all messages over `transport`, one
    /// at a time. For datagram transports, nothing is sent and the single
    /// response message is returned in the summary instead.
    pub async fn run(
        mut self,
        transport: &mut dyn XfrTransport,
    ) -> Result<XfrSummary, XfrError> {
        match self.send_all(transport).await {
            Ok(datagram) => {
                self.set_state(SessionState::Done);
                debug!(
                    "Finished {} of {}: {} messages, {} records, {} bytes",
                    self.kind,
                    self.snapshot.apex_name(),
                    self.messages,
                    self.records,
                    self.bytes
                );
                Ok(XfrSummary {
                    kind: self.kind,
                    messages: self.messages,
                    records: self.records,
                    bytes: self.bytes,
                    datagram,
                })
            }
            Err(err) => {
                self.set_state(SessionState::Failed);
                match err {
                    XfrError::TransportFailure(_) => warn!(
                        "{} of {} aborted after {} messages: {err}",
                        self.kind,
                        self.snapshot.apex_name(),
                        self.messages
                    ),
                    _ => error!(
                        "{} of {} failed after {} messages: {err}",
                        self.kind,
                        self.snapshot.apex_name(),
                        self.messages
                    ),
                }
                Err(err)
            }
        }
    }

    async fn send_all(
        &mut self,
        transport: &mut dyn XfrTransport,
    ) -> Result<Option<Bytes>, XfrError> {
        let mut status = self.stream.first()?;
        loop {
            self.set_state(SessionState::Building);
            status = self.fill(status)?;
            let len = self.render()?;
            let exhausted = !status.is_ready();

            if self.transport.is_datagram() {
                // https://datatracker.ietf.org/doc/html/rfc1995#section-2
                //   "If the UDP reply does not fit, the query is responded
                //    to with a single SOA record of the server's current
                //    version [...]"
                if !exhausted {
                    let size = self.stream.current().map_or(0, |r| r.wire_len());
                    return Err(XfrError::RecordTooLarge(size));
                }
                self.count(len);
                return Ok(Some(Bytes::copy_from_slice(&self.out)));
            }

            let prefix = u16::try_from(len)
                .map_err(|_| XfrError::Internal("message too long"))?;
            self.out[..LENGTH_PREFIX_LEN].copy_from_slice(&prefix.to_be_bytes());

            self.set_state(SessionState::Sending);
            transport
                .send(&self.out)
                .await
                .map_err(XfrError::TransportFailure)?;
            self.count(len);
            debug!(
                "Sent {} message {} for {}: {} records, {len} bytes",
                self.kind,
                self.messages,
                self.snapshot.apex_name(),
                self.scratch.len()
            );
            if exhausted {
                return Ok(None);
            }
        }
    }

    /// Collects the records for the next message.
    ///
    /// Takes the status of the last stream move and returns the status
    /// after the last record taken.
    fn fill(&mut self, mut status: RrStatus) -> Result<RrStatus, XfrError> {
        self.scratch.clear();
        self.scratch.reserve(HEADER_LEN)?;
        if self.messages == 0 {
            if let Some(question) = &self.question {
                self.scratch.reserve(question.qname().len() + 4)?;
            }
        }

        while status.is_ready() {
            let record = self
                .stream
                .current()
                .ok_or(XfrError::Internal("ready stream without record"))?;
            let len = record.wire_len();
            if !self.scratch.fits(len) {
                if self.scratch.is_empty() {
                    return Err(XfrError::RecordTooLarge(len));
                }
                trace!("Deferring record of {len} bytes to the next message");
                break;
            }
            self.scratch.push(record)?;
            status = self.stream.next()?;
            if self.one_answer {
                break;
            }
        }
        Ok(status)
    }

    /// Renders the collected records into the output buffer.
    ///
    /// Returns the length of the message without the length prefix.
    fn render(&mut self) -> Result<usize, XfrError> {
        self.out.clear();
        if !self.transport.is_datagram() {
            self.out.extend_from_slice(&[0; LENGTH_PREFIX_LEN]);
        }
        let start = self.out.len();

        let mut header = Header::response_to(&self.request);
        header.set_opcode(Opcode::QUERY);
        header.set_aa(true);
        header.set_rcode(Rcode::NOERROR);

        let mut msg =
            MessageRenderer::new(&mut self.out, header, self.scratch.limit())?;
        if self.messages == 0 {
            if let Some(question) = &self.question {
                msg.push_question(
                    question.qname(),
                    question.qtype(),
                    question.qclass(),
                )?;
            }
        }
        for (owner, rest) in self.scratch.iter() {
            msg.push_raw_answer(owner, rest)?;
        }
        msg.finish();

        if let Some(signing) = &mut self.signing {
            signing.sign(&mut self.out, start)?;
        }

        Ok(self.out.len() - start)
    }

    /// Accounts for a message once it has been handed off.
    fn count(&mut self, len: usize) {
        self.messages += 1;
        self.records += self.scratch.len();
        self.bytes += len;
    }

    fn set_state(&mut self, state: SessionState) {
        trace!("Transfer session state {:?} -> {state:?}", self.state);
        self.state = state;
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use crate::base::iana::{Class, Rtype};
    use crate::base::name::Name;
    use crate::base::record::{Record, Soa};
    use crate::xfr::select::select;
    use crate::xfr::transport::ChannelTransport;
    use crate::zonetree::in_memory::ZoneBuilder;
    use crate::zonetree::ZoneTree;

    use super::*;

    fn session() -> XfrSession {
        let apex = Name::from_str("example.com").unwrap();
        let soa = Soa::new(
            Name::from_str("ns.example.com").unwrap(),
            Name::from_str("hostmaster.example.com").unwrap(),
            1.into(),
            600,
            600,
            3600000,
            604800,
        );
        let mut builder = ZoneBuilder::new(apex.clone(), Class::IN);
        builder
            .insert(Record::new(apex.clone(), Class::IN, 600, soa.to_record_data()))
            .unwrap();
        let mut tree = ZoneTree::new();
        builder.finalize_into_set(&mut tree).unwrap();

        let config = XfrConfig::new();
        let req =
            XfrRequest::new(1, apex, Rtype::AXFR, Class::IN, TransportKind::Stream);
        let selected = select(&req, &tree, &config).unwrap();
        XfrSession::new(req, selected, &config).unwrap()
    }

    #[tokio::test]
    async fn failed_send_is_not_counted() {
        let mut session = session();
        let (mut transport, rx) = ChannelTransport::new(1);
        drop(rx);
        let res = session.send_all(&mut transport).await;
        assert!(matches!(res, Err(XfrError::TransportFailure(_))));
        assert_eq!(session.messages, 0);
        assert_eq!(session.records, 0);
        assert_eq!(session.bytes, 0);
    }

    #[tokio::test]
    async fn sent_messages_are_counted() {
        let mut session = session();
        let (mut transport, mut rx) = ChannelTransport::new(4);
        assert!(session.send_all(&mut transport).await.unwrap().is_none());
        let msg = rx.recv().await.unwrap();
        assert_eq!(session.messages, 1);
        assert_eq!(session.records, 2);
        assert_eq!(session.bytes, msg.len() - LENGTH_PREFIX_LEN);
    }
}
