use async_trait::async_trait;
use pairlink_core::{
    CandidatePayload, IceCandidate, PeerId, SdpPayload, SessionDescription, SignalMessage,
};

use crate::error::NetworkError;

/// Outgoing half of the signaling channel, as the negotiation logic sees it.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn emit(&self, msg: SignalMessage) -> Result<(), NetworkError>;

    async fn send_offer(
        &self,
        target: PeerId,
        caller: PeerId,
        sdp: SessionDescription,
    ) -> Result<(), NetworkError> {
        self.emit(SignalMessage::Offer(SdpPayload {
            target,
            caller,
            sdp,
        }))
        .await
    }

    async fn send_answer(
        &self,
        target: PeerId,
        caller: PeerId,
        sdp: SessionDescription,
    ) -> Result<(), NetworkError> {
        self.emit(SignalMessage::Answer(SdpPayload {
            target,
            caller,
            sdp,
        }))
        .await
    }

    async fn send_ice(&self, target: PeerId, candidate: IceCandidate) -> Result<(), NetworkError> {
        self.emit(SignalMessage::IceCandidate(CandidatePayload { target, candidate }))
            .await
    }
}
