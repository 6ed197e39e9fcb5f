//! Delivery of envelopes between contexts
//!
//! Delivery is fire-and-forget and ordered per sender. The channel
//! transport mirrors a window-level message port: it only carries envelopes
//! whose target is the peer it was opened for.

use tokio::sync::mpsc;

use crate::message::Envelope;
use crate::origin::TargetOrigin;

/// Transport errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The receiving context is gone
    #[error("preview transport closed")]
    Closed,

    /// Message could not be encoded
    #[error("failed to encode preview message: {0}")]
    Encode(String),

    /// Envelope addressed to a context this transport does not reach
    #[error("envelope for {target} cannot be delivered to {peer}")]
    WrongTarget { target: String, peer: String },
}

/// Outbound half of a connection to another context
pub trait PreviewTransport: Send + Sync {
    /// Hand an envelope to the transport without waiting for receipt
    ///
    /// # Errors
    /// Returns error if the envelope cannot be delivered
    fn post(&self, envelope: Envelope) -> Result<(), TransportError>;
}

/// In-process transport over an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    peer: TargetOrigin,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl ChannelTransport {
    /// Transport reaching `peer`, and the receiver the peer reads from
    #[must_use]
    pub fn open(peer: TargetOrigin) -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { peer, tx }, rx)
    }

    /// Origin of the context this transport reaches
    #[inline]
    #[must_use]
    pub fn peer(&self) -> &TargetOrigin {
        &self.peer
    }
}

impl PreviewTransport for ChannelTransport {
    fn post(&self, envelope: Envelope) -> Result<(), TransportError> {
        if envelope.target_origin != self.peer {
            return Err(TransportError::WrongTarget {
                target: envelope.target_origin.to_string(),
                peer: self.peer.to_string(),
            });
        }
        self.tx.send(envelope).map_err(|_| TransportError::Closed)
    }
}
