use crate::channel::ChannelState;
use crate::negotiation::NegotiationState;
use pairlink_core::{SdpKind, SignalKind};
use std::time::Duration;
use thiserror::Error;

/// Failure talking to the rendezvous service.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("failed to connect to signaling service at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("signaling service at {url} did not greet us: {reason}")]
    Handshake { url: String, reason: String },

    #[error("failed to encode {kind} message: {source}")]
    Encode {
        kind: SignalKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("signaling connection is closed")]
    Closed,
}

/// Failure reported by the underlying media/ICE engine.
#[derive(Debug, Error)]
#[error("{operation} failed: {source:#}")]
pub struct TransportError {
    pub operation: &'static str,
    #[source]
    pub source: anyhow::Error,
}

impl TransportError {
    pub fn new(operation: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    /// The state gate refused the operation; nothing was changed.
    #[error("{operation} is not permitted in state {state}")]
    InvalidState {
        operation: &'static str,
        state: NegotiationState,
    },

    #[error("expected an {expected:?} description, got {actual:?}")]
    UnexpectedDescription { expected: SdpKind, actual: SdpKind },

    #[error("connection engine rejected the negotiation: {0}")]
    Rejected(#[from] TransportError),

    #[error("negotiation message could not be delivered: {0}")]
    Signaling(#[from] NetworkError),

    #[error("negotiation did not reach stable within {0:?}")]
    Timeout(Duration),
}

impl NegotiationError {
    /// Whether the owning context has to be torn down.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Timeout(_))
    }
}

/// A remote candidate the engine refused. The candidate is dropped.
#[derive(Debug, Error)]
#[error("failed to apply ICE candidate {candidate:?}: {source}")]
pub struct IceApplyError {
    pub candidate: String,
    #[source]
    pub source: TransportError,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("data channel is not open (state: {state})")]
pub struct ChannelNotOpenError {
    pub state: ChannelState,
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    NotOpen(#[from] ChannelNotOpenError),

    #[error("failed to write to data channel: {0}")]
    Transport(#[from] TransportError),
}
