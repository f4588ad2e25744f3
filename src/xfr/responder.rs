//! Answering transfer requests for a set of zones.

use std::sync::Arc;

use tracing::{debug, error};

use crate::zonetree::ZoneTree;

use super::config::XfrConfig;
use super::error::XfrError;
use super::request::{render_error_response, XfrRequest};
use super::select::select;
use super::session::{XfrSession, XfrSummary};
use super::transport::XfrTransport;

//------------ XfrResponder --------------------------------------------------

/// Answers zone transfer requests from a zone tree.
///
/// The responder holds no state between transfers. Concurrent transfers
/// each get their own session with its own snapshot of the zone.
#[derive(Clone, Debug)]
pub struct XfrResponder {
    zones: Arc<ZoneTree>,
    config: XfrConfig,
}

impl XfrResponder {
    pub fn new(zones: Arc<ZoneTree>, config: XfrConfig) -> Self {
        Self { zones, config }
    }

    pub fn zones(&self) -> &Arc<ZoneTree> {
        &self.zones
    }

    pub fn config(&self) -> &XfrConfig {
        &self.config
    }

    /// Prepares the session for answering a request.
    ///
    /// Fails if the request can't be answered with a transfer. The error's
    /// [`rcode`][XfrError::rcode] is what to answer the request with.
    pub fn prepare(&self, req: XfrRequest) -> Result<XfrSession, XfrError> {
        let selected = select(&req, &self.zones, &self.config)?;
        XfrSession::new(req, selected, &self.config)
    }

    /// Answers a request.
    ///
    /// If the request can't be answered with a transfer over a stream
    /// transport, an error response is sent instead and the error is
    /// returned once it has been sent. For datagram transports, nothing is
    /// ever sent: the response to send is either in the summary or, on
    /// error, to be rendered by the caller via [`render_error_response`].
    pub async fn respond(
        &self,
        req: XfrRequest,
        transport: &mut dyn XfrTransport,
    ) -> Result<XfrSummary, XfrError> {
        let header = req.header();
        let question = req.questions().first().cloned();
        let datagram = req.transport().is_datagram();

        let session = match self.prepare(req) {
            Ok(session) => session,
            Err(err) => {
                let Some(rcode) = err.rcode().filter(|_| !datagram) else {
                    return Err(err);
                };
                debug!("Answering transfer request with {rcode}: {err}");
                let response =
                    render_error_response(&header, question.as_ref(), rcode)?;
                let len = u16::try_from(response.len())
                    .map_err(|_| XfrError::Internal("error response too long"))?;
                let mut msg = Vec::with_capacity(response.len() + 2);
                msg.extend_from_slice(&len.to_be_bytes());
                msg.extend_from_slice(&response);
                if let Err(send_err) = transport.send(&msg).await {
                    error!("Failed to send error response: {send_err}");
                    return Err(XfrError::TransportFailure(send_err));
                }
                return Err(err);
            }
        };
        session.run(transport).await
    }
}
