use async_trait::async_trait;
use pairlink_core::{IceCandidate, SessionDescription};
use std::sync::Arc;

use crate::error::TransportError;
use crate::transport::TransportEventSink;

/// The media/ICE engine as seen by the negotiation logic.
///
/// Implementations perform the actual traversal; everything ordering-related
/// (state gates, candidate buffering) lives above this trait.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError>;

    async fn create_answer(&self) -> Result<SessionDescription, TransportError>;

    async fn set_local_description(&self, desc: SessionDescription)
    -> Result<(), TransportError>;

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), TransportError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError>;

    /// Create a reliable, ordered data channel on this connection.
    async fn create_data_channel(
        &self,
        label: &str,
    ) -> Result<Arc<dyn ChannelTransport>, TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

#[async_trait]
pub trait ChannelTransport: Send + Sync {
    fn label(&self) -> String;

    async fn send_text(&self, text: String) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// Builds one [`PeerTransport`] per peer connection context.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn connect(
        &self,
        events: TransportEventSink,
    ) -> Result<Arc<dyn PeerTransport>, TransportError>;
}
