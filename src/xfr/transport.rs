//! Sending transfer messages.

use std::io;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

//------------ XfrTransport --------------------------------------------------

/// Something transfer messages can be sent over.
///
/// A transfer awaits each send before it renders the next message. Any
/// timeouts are up to the transport.
pub trait XfrTransport: Send {
    /// Sends a message.
    ///
    /// On stream transports, `msg` already starts with the two byte length.
    fn send<'a>(&'a mut self, msg: &'a [u8]) -> BoxFuture<'a, io::Result<()>>;
}

//------------ StreamTransport -----------------------------------------------

/// A transport writing to a byte stream, such as a TCP connection.
pub struct StreamTransport<W> {
    stream: W,
}

impl<W> StreamTransport<W> {
    pub fn new(stream: W) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> W {
        self.stream
    }
}

impl<W: AsyncWrite + Unpin + Send> XfrTransport for StreamTransport<W> {
    fn send<'a>(&'a mut self, msg: &'a [u8]) -> BoxFuture<'a, io::Result<()>> {
        async move {
            self.stream.write_all(msg).await?;
            self.stream.flush().await
        }
        .boxed()
    }
}

//------------ ChannelTransport ----------------------------------------------

/// A transport handing messages to a channel.
///
/// Sending waits while the channel is full. Once the receiver is gone,
/// sending fails with [`io::ErrorKind::BrokenPipe`].
pub struct ChannelTransport {
    sender: mpsc::Sender<Bytes>,
}

impl ChannelTransport {
    /// Creates a transport with room for `buffer` messages in flight.
    ///
    /// There is always room for at least one message.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (Self { sender }, receiver)
    }
}

impl XfrTransport for ChannelTransport {
    fn send<'a>(&'a mut self, msg: &'a [u8]) -> BoxFuture<'a, io::Result<()>> {
        async move {
            self.sender
                .send(Bytes::copy_from_slice(msg))
                .await
                .map_err(|_| {
                    io::Error::new(io::ErrorKind::BrokenPipe, "receiver dropped")
                })
        }
        .boxed()
    }
}
