//! Signing transfer messages.
//!
//! A signed transfer signs every message. The signature of each message
//! covers the MAC of the message before it, the first message chaining to
//! the MAC of the request. Computing signatures is left to a
//! [`MessageSigner`]; the transfer only drives it and keeps the chain.

use core::fmt;

use bytes::Bytes;
use tracing::trace;

use crate::base::wire::HEADER_LEN;

//------------ MessageSigner -------------------------------------------------

/// Something that can sign transfer messages.
pub trait MessageSigner: Send {
    /// Returns the number of bytes to reserve in a message for signing.
    fn reserved_len(&self) -> usize;

    /// Signs a complete message.
    ///
    /// The signature covers `prior_mac`, which is the MAC of the previous
    /// message or, if `first` is true, the MAC of the request. Returns the
    /// MAC of the signed message.
    fn sign(
        &mut self,
        message: &mut SignTarget<'_>,
        prior_mac: Option<&[u8]>,
        first: bool,
    ) -> Result<Bytes, SignError>;
}

//------------ SignTarget ----------------------------------------------------

/// A rendered message handed to a signer.
///
/// Gives access to the message bytes and allows appending records to the
/// additional section.
pub struct SignTarget<'a> {
    buf: &'a mut Vec<u8>,
    start: usize,
}

impl<'a> SignTarget<'a> {
    /// Wraps the message that starts at `start` in `buf`.
    pub fn new(buf: &'a mut Vec<u8>, start: usize) -> Self {
        Self { buf, start }
    }

    /// Returns the message.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[self.start..]
    }

    /// Returns the length of the message.
    pub fn len(&self) -> usize {
        self.buf.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a record in wire format to the additional section.
    pub fn push_additional(&mut self, record: &[u8]) -> Result<(), SignError> {
        if self.len() < HEADER_LEN {
            return Err(SignError::new("message too short"));
        }
        let pos = self.start + 10;
        let arcount = u16::from_be_bytes([self.buf[pos], self.buf[pos + 1]])
            .checked_add(1)
            .ok_or(SignError::new("too many additional records"))?;
        self.buf[pos..pos + 2].copy_from_slice(&arcount.to_be_bytes());
        self.buf.extend_from_slice(record);
        Ok(())
    }
}

//------------ SigningContext ------------------------------------------------

/// What is needed to sign the responses to a signed request.
pub struct SigningContext {
    signer: Box<dyn MessageSigner>,
    request_mac: Bytes,
}

impl SigningContext {
    pub fn new(signer: Box<dyn MessageSigner>, request_mac: Bytes) -> Self {
        Self {
            signer,
            request_mac,
        }
    }

    pub fn reserved_len(&self) -> usize {
        self.signer.reserved_len()
    }

    pub fn request_mac(&self) -> &Bytes {
        &self.request_mac
    }
}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("reserved_len", &self.signer.reserved_len())
            .field("request_mac_len", &self.request_mac.len())
            .finish()
    }
}

//------------ SigningChain --------------------------------------------------

/// Signs the messages of one transfer in sequence.
pub(crate) struct SigningChain {
    signer: Box<dyn MessageSigner>,
    last_mac: Bytes,
    signed: usize,
}

impl SigningChain {
    pub fn new(context: SigningContext) -> Self {
        Self {
            signer: context.signer,
            last_mac: context.request_mac,
            signed: 0,
        }
    }

    pub fn reserved_len(&self) -> usize {
        self.signer.reserved_len()
    }

    /// Signs the next message of the transfer.
    pub fn sign(&mut self, buf: &mut Vec<u8>, start: usize) -> Result<(), SignError> {
        let before = buf.len() - start;
        let mac = self.signer.sign(
            &mut SignTarget::new(buf, start),
            Some(self.last_mac.as_ref()),
            self.signed == 0,
        )?;
        if buf.len() - start - before > self.signer.reserved_len() {
            return Err(SignError::new("signature exceeds reserved space"));
        }
        trace!("Signed transfer message {}", self.signed);
        self.last_mac = mac;
        self.signed += 1;
        Ok(())
    }
}

//------------ SignError -----------------------------------------------------

/// A message could not be signed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignError(&'static str);

impl SignError {
    pub fn new(msg: &'static str) -> Self {
        Self(msg)
    }
}

impl fmt::Display for SignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signing failed: {}", self.0)
    }
}

impl std::error::Error for SignError {}
