//! Deciding how to answer a transfer request.

use core::cmp::Ordering;
use core::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::base::iana::Rtype;
use crate::base::serial::Serial;
use crate::journal::JournalError;
use crate::zonetree::{StoreError, ZoneSnapshot, ZoneTree};

use super::axfr::FullZoneStream;
use super::compound::CompoundStream;
use super::config::{XfrConfig, XfrMode};
use super::error::XfrError;
use super::ixfr::DiffStream;
use super::request::XfrRequest;
use super::soa::SingleRecordStream;
use super::stream::XfrStream;

//------------ XfrKind -------------------------------------------------------

/// The kind of answer chosen for a transfer request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum XfrKind {
    /// A full transfer requested as such.
    Axfr,

    /// An incremental transfer.
    Ixfr,

    /// A full transfer sent in response to an incremental request.
    AxfrFallback,

    /// Just the current SOA in response to an incremental request.
    SoaOnly,
}

impl fmt::Display for XfrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            XfrKind::Axfr => "AXFR",
            XfrKind::Ixfr => "IXFR",
            XfrKind::AxfrFallback => "AXFR-style IXFR",
            XfrKind::SoaOnly => "SOA-only IXFR",
        })
    }
}

//------------ Selected ------------------------------------------------------

/// The answer chosen for a transfer request.
pub struct Selected {
    kind: XfrKind,
    snapshot: Arc<dyn ZoneSnapshot>,
    stream: XfrStream,
}

impl Selected {
    pub fn kind(&self) -> XfrKind {
        self.kind
    }

    pub fn snapshot(&self) -> &Arc<dyn ZoneSnapshot> {
        &self.snapshot
    }

    pub fn into_parts(self) -> (XfrKind, Arc<dyn ZoneSnapshot>, XfrStream) {
        (self.kind, self.snapshot, self.stream)
    }
}

//------------ select --------------------------------------------------------

/// Chooses the answer to a transfer request.
///
/// Returns an error for requests that can't be answered with a transfer.
/// An incremental request the available history can't serve is answered
/// with a full transfer.
pub fn select(
    req: &XfrRequest,
    zones: &ZoneTree,
    config: &XfrConfig,
) -> Result<Selected, XfrError> {
    let [question] = req.questions() else {
        return Err(XfrError::FormatError("expected exactly one question"));
    };
    let qname = question.qname();
    let qclass = question.qclass();
    let qtype = question.qtype();
    if qtype != Rtype::AXFR && qtype != Rtype::IXFR {
        return Err(XfrError::FormatError("not a zone transfer request"));
    }
    let client = req.client_display();

    let Some(zone) = zones.get_zone(qname, qclass) else {
        // https://datatracker.ietf.org/doc/html/rfc5936#section-2.2.1
        // 2.2.1 Header Values
        //   "If a server is not authoritative for the queried zone, the
        //    server SHOULD set the value to NotAuth(9)"
        debug!("{qtype} for {qname} from {client} refused: unknown zone");
        return Err(XfrError::NotAuthoritative);
    };

    // https://datatracker.ietf.org/doc/html/rfc1995#section-3
    // 3. Query Format
    //   "The IXFR query packet format is the same as that of a normal DNS
    //    query, but with the query type being IXFR and the authority
    //    section containing the SOA record of client's version of the
    //    zone."
    let begin_serial = if qtype == Rtype::IXFR {
        let mut soas = req.authority().iter().filter(|record| {
            record.is_soa()
                && record.owner() == qname
                && record.class() == qclass
        });
        let (Some(soa), None) = (soas.next(), soas.next()) else {
            warn!(
                "{qtype} for {qname} from {client} refused: IXFR request needs exactly one authority section SOA"
            );
            return Err(XfrError::FormatError(
                "IXFR request needs exactly one SOA in the authority section",
            ));
        };
        Some(
            soa.soa_serial()
                .ok_or(XfrError::FormatError("malformed IXFR request SOA"))?,
        )
    } else {
        None
    };

    // https://datatracker.ietf.org/doc/html/rfc5936#section-4.2
    // 4.2.  UDP
    //   "[...] AXFR sessions over UDP transport are not defined."
    let datagram = req.transport().is_datagram();
    if qtype == Rtype::AXFR && datagram {
        warn!("{qtype} for {qname} from {client} refused: AXFR not supported over UDP");
        return Err(XfrError::FormatError("AXFR over UDP"));
    }

    let snapshot = zone.open_snapshot()?;
    let soa = snapshot.soa()?;
    let current_serial = soa.soa_serial().ok_or(StoreError::InvalidSoa)?;
    let bracket = Arc::new(SingleRecordStream::new(soa));

    let mut kind = XfrKind::Axfr;
    if let Some(begin_serial) = begin_serial {
        // https://datatracker.ietf.org/doc/html/rfc1995#section-2
        // 2. Brief Description of the Protocol
        //   "If an IXFR query with the same or newer version number than
        //    that of the server is received, it is replied to with a single
        //    SOA record of the server's current version [...]"
        //   "If the UDP reply does not fit, the query is responded to with
        //    a single SOA record of the server's current version to inform
        //    the client that a TCP query should be initiated."
        let up_to_date = matches!(
            begin_serial.partial_cmp(&current_serial),
            Some(Ordering::Greater | Ordering::Equal)
        );
        if up_to_date || datagram {
            debug!(
                "IXFR for {qname} from {client}: answering with the current SOA \
                 (client at {begin_serial}, zone at {current_serial})"
            );
            return Ok(Selected {
                kind: XfrKind::SoaOnly,
                snapshot,
                stream: XfrStream::Single(bracket),
            });
        }

        match ixfr_stream(req, zone.journal(), config, begin_serial, current_serial)? {
            Some(diff) => {
                info!(
                    "IXFR for {qname} from {client}: {begin_serial} to {current_serial}"
                );
                return Ok(Selected {
                    kind: XfrKind::Ixfr,
                    snapshot,
                    stream: CompoundStream::new(bracket, diff.into()).into(),
                });
            }
            None => kind = XfrKind::AxfrFallback,
        }
    } else {
        info!("AXFR for {qname} from {client} at serial {current_serial}");
    }

    let data = FullZoneStream::new(snapshot.clone());
    Ok(Selected {
        kind,
        snapshot,
        stream: CompoundStream::new(bracket, data.into()).into(),
    })
}

/// Opens the diff stream for an incremental transfer.
///
/// Returns `Ok(None)` if a full transfer has to be sent instead.
fn ixfr_stream(
    req: &XfrRequest,
    journal: Option<&Arc<dyn crate::journal::Journal>>,
    config: &XfrConfig,
    begin_serial: Serial,
    current_serial: Serial,
) -> Result<Option<DiffStream>, XfrError> {
    let qname = req
        .questions()
        .first()
        .map(|question| question.qname().to_string())
        .unwrap_or_default();
    let client = req.client_display();

    if config.xfr_mode() == XfrMode::AxfrOnly {
        debug!(
            "IXFR for {qname} from {client}: falling back to AXFR as mode is set to AXFR only"
        );
        return Ok(None);
    }
    let Some(journal) = journal else {
        info!("IXFR for {qname} from {client}: no journal, falling back to AXFR");
        return Ok(None);
    };
    match DiffStream::open(journal.as_ref(), begin_serial, current_serial) {
        Ok(diff) => Ok(Some(diff)),
        Err(XfrError::HistoryUnavailable(JournalError::NotFound)) => {
            info!(
                "IXFR for {qname} from {client}: no journal history, falling back to AXFR"
            );
            Ok(None)
        }
        Err(XfrError::HistoryUnavailable(err)) => {
            info!(
                "IXFR for {qname} from {client}: {err} for serial {begin_serial}, falling back to AXFR"
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
