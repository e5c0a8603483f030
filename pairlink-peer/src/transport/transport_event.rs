use bytes::Bytes;
use pairlink_core::IceCandidate;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::transport::ChannelTransport;

/// Generation number of a peer connection context. Events carry it so that
/// late callbacks from a torn-down connection can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

/// Events the connection engine raises for the coordinator.
pub enum TransportEvent {
    /// A local candidate was gathered and has to reach the peer through signaling.
    CandidateDiscovered(IceCandidate),

    /// The engine wants a fresh offer, e.g. after the first data channel was created.
    NegotiationNeeded,

    ConnectionStateChanged(IceConnectionState),

    /// The remote side opened a channel (responder only).
    IncomingChannel(Arc<dyn ChannelTransport>),

    ChannelOpen,

    ChannelMessage(Bytes),

    ChannelClosed,
}

impl fmt::Debug for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CandidateDiscovered(c) => f.debug_tuple("CandidateDiscovered").field(c).finish(),
            Self::NegotiationNeeded => f.write_str("NegotiationNeeded"),
            Self::ConnectionStateChanged(s) => {
                f.debug_tuple("ConnectionStateChanged").field(s).finish()
            }
            Self::IncomingChannel(c) => f.debug_tuple("IncomingChannel").field(&c.label()).finish(),
            Self::ChannelOpen => f.write_str("ChannelOpen"),
            Self::ChannelMessage(b) => f.debug_tuple("ChannelMessage").field(&b.len()).finish(),
            Self::ChannelClosed => f.write_str("ChannelClosed"),
        }
    }
}

/// Where a transport pushes its events, pre-tagged with its context.
#[derive(Clone)]
pub struct TransportEventSink {
    context: ContextId,
    tx: mpsc::Sender<(ContextId, TransportEvent)>,
}

impl TransportEventSink {
    pub fn new(context: ContextId, tx: mpsc::Sender<(ContextId, TransportEvent)>) -> Self {
        Self { context, tx }
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub async fn emit(&self, event: TransportEvent) {
        if self.tx.send((self.context, event)).await.is_err() {
            debug!("{}: coordinator gone, dropping transport event", self.context);
        }
    }
}
