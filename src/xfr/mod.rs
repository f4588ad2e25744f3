//! Outgoing zone transfers.
//!
//! This module answers AXFR and IXFR requests for zones held in a
//! [`ZoneTree`]. Answering a request happens in two steps.
//!
//! First, [`select`] decides how to answer. A full transfer sends every
//! record of a snapshot of the zone bracketed by its SOA. An incremental
//! transfer sends the journaled changes since the client's serial, again
//! bracketed by the current SOA. If the client is up to date, or the
//! request came over a datagram transport, the answer is just the current
//! SOA. If the journal can't serve the request, a full transfer is sent
//! instead.
//!
//! Second, an [`XfrSession`] splits the records into messages no larger
//! than the configured maximum, optionally signs each one, and hands them
//! to an [`XfrTransport`] one at a time.
//!
//! [`XfrResponder`] combines both steps.
//!
//! ```no_run
//! # async fn example(
//! #     zones: std::sync::Arc<domain_xfrout::zonetree::ZoneTree>,
//! #     req: domain_xfrout::xfr::XfrRequest,
//! #     stream: tokio::io::DuplexStream,
//! # ) {
//! use domain_xfrout::xfr::{StreamTransport, XfrConfig, XfrResponder};
//!
//! let responder = XfrResponder::new(zones, XfrConfig::new());
//! let mut transport = StreamTransport::new(stream);
//! match responder.respond(req, &mut transport).await {
//!     Ok(summary) => println!("sent {} messages", summary.messages),
//!     Err(err) => eprintln!("transfer failed: {err}"),
//! }
//! # }
//! ```
//!
//! [`ZoneTree`]: crate::zonetree::ZoneTree

mod buffer;
mod compound;
mod config;
mod enumerator;
mod error;
mod request;
mod responder;
mod select;
mod session;
mod soa;
mod stream;
mod transport;
pub mod tsig;

mod axfr;
mod ixfr;


pub use self::axfr::FullZoneStream;
pub use self::buffer::ScratchBuffer;
pub use self::compound::CompoundStream;
pub use self::config::{XfrConfig, XfrMode};
pub use self::enumerator::ZoneEnumerator;
pub use self::error::XfrError;
pub use self::ixfr::DiffStream;
pub use self::request::{render_error_response, TransportKind, XfrRequest};
pub use self::responder::XfrResponder;
pub use self::select::{select, Selected, XfrKind};
pub use self::session::{SessionState, XfrSession, XfrSummary};
pub use self::soa::SingleRecordStream;
pub use self::stream::XfrStream;
pub use self::transport::{ChannelTransport, StreamTransport, XfrTransport};
pub use self::tsig::{MessageSigner, SignError, SignTarget, SigningContext};
