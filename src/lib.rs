//! Outgoing DNS zone transfers.
//!
//! This crate implements the primary side of zone transfers: answering
//! AXFR ([RFC 5936]) and IXFR ([RFC 1995]) requests from secondaries with
//! the content of, or the changes to, zones served from memory.
//!
//! # Modules
//!
//! * [base] contains the fundamental DNS types: names, record types and
//!   classes, serial numbers, records, and a message renderer and parser
//!   restricted to what transfers need.
//! * [zonetree] holds the zones. It defines the traits a zone store has to
//!   provide and contains an in-memory store with versioned content.
//! * [journal] keeps the history of changes to a zone that incremental
//!   transfers are built from.
//! * [xfr] selects how to answer a transfer request and sends the answer
//!   as a sequence of messages.
//!
//! Parsing requests off the wire, access control, and TSIG verification
//! are left to the server embedding this crate. The result of these steps
//! is an [`XfrRequest`][xfr::XfrRequest].
//!
//! # Reference of feature flags
//!
//! * `logging`: provides [`logging::init_logging`] for setting up a
//!   [tracing-subscriber] that prints the events this crate emits.
//!
//! [RFC 1995]: https://tools.ietf.org/html/rfc1995
//! [RFC 5936]: https://tools.ietf.org/html/rfc5936
//! [tracing-subscriber]: https://crates.io/crates/tracing-subscriber

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base;
pub mod journal;
pub mod xfr;
pub mod zonetree;

#[cfg(any(test, feature = "logging"))]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;
