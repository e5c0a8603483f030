use pairlink_core::{IceCandidate, PeerId, SdpKind, SessionDescription};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{IceApplyError, NegotiationError};
use crate::ice::{AddOutcome, IceCandidateBuffer};
use crate::negotiation::{NegotiationRole, NegotiationState};
use crate::signaling::SignalingOutput;
use crate::transport::PeerTransport;

/// Offer/answer state machine for one peer connection.
///
/// Every entry point takes `&mut self`, so at most one negotiation step runs
/// at a time; the state gates below decide whether a step may start at all.
pub struct NegotiationEngine {
    role: NegotiationRole,
    local_id: PeerId,
    remote_id: PeerId,
    state: NegotiationState,
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    candidates: IceCandidateBuffer,
    transport: Arc<dyn PeerTransport>,
    signaling: Arc<dyn SignalingOutput>,
}

impl NegotiationEngine {
    pub fn new(
        role: NegotiationRole,
        local_id: PeerId,
        remote_id: PeerId,
        transport: Arc<dyn PeerTransport>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            role,
            local_id,
            remote_id,
            state: NegotiationState::Idle,
            local_description: None,
            remote_description: None,
            candidates: IceCandidateBuffer::new(),
            transport,
            signaling,
        }
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn remote_id(&self) -> PeerId {
        self.remote_id
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.local_description.as_ref()
    }

    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.remote_description.as_ref()
    }

    pub fn pending_candidates(&self) -> usize {
        self.candidates.pending()
    }

    pub fn transport(&self) -> &Arc<dyn PeerTransport> {
        &self.transport
    }

    fn require(
        &self,
        operation: &'static str,
        expected: NegotiationState,
    ) -> Result<(), NegotiationError> {
        if self.state != expected {
            return Err(NegotiationError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn require_kind(desc: &SessionDescription, expected: SdpKind) -> Result<(), NegotiationError> {
        if desc.kind != expected {
            return Err(NegotiationError::UnexpectedDescription {
                expected,
                actual: desc.kind,
            });
        }
        Ok(())
    }

    /// Initiator: produce the offer and send it to the remote peer.
    pub async fn create_offer(&mut self) -> Result<(), NegotiationError> {
        self.require("create offer", NegotiationState::Idle)?;

        let offer = self.transport.create_offer().await?;
        self.transport.set_local_description(offer.clone()).await?;
        self.local_description = Some(offer.clone());
        self.state = NegotiationState::HaveLocalOffer;

        info!("Sending offer to {}", self.remote_id);
        self.signaling
            .send_offer(self.remote_id, self.local_id, offer)
            .await?;
        Ok(())
    }

    /// Responder: accept the remote offer and answer `caller`.
    pub async fn handle_offer(
        &mut self,
        desc: SessionDescription,
        caller: PeerId,
    ) -> Result<(), NegotiationError> {
        self.require("handle offer", NegotiationState::Idle)?;
        Self::require_kind(&desc, SdpKind::Offer)?;

        self.transport.set_remote_description(desc.clone()).await?;
        self.remote_description = Some(desc);
        self.state = NegotiationState::HaveRemoteOffer;
        self.candidates.flush(self.transport.as_ref()).await;

        let answer = self.transport.create_answer().await?;
        self.transport.set_local_description(answer.clone()).await?;
        self.local_description = Some(answer.clone());
        self.state = NegotiationState::Stable;

        info!("Sending answer to {}", caller);
        self.signaling
            .send_answer(caller, self.local_id, answer)
            .await?;
        Ok(())
    }

    /// Initiator: complete the handshake. Stale or duplicate answers are
    /// ignored.
    pub async fn handle_answer(&mut self, desc: SessionDescription) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::HaveLocalOffer {
            warn!(
                "Ignoring answer from {} in state {}",
                self.remote_id, self.state
            );
            return Ok(());
        }
        Self::require_kind(&desc, SdpKind::Answer)?;

        self.transport.set_remote_description(desc.clone()).await?;
        self.remote_description = Some(desc);
        self.state = NegotiationState::Stable;
        self.candidates.flush(self.transport.as_ref()).await;

        info!("Negotiation with {} is stable", self.remote_id);
        Ok(())
    }

    /// The engine asked for a description refresh. Only honoured before any
    /// description exists, which keeps both sides from offering at once.
    pub async fn handle_negotiation_needed(&mut self) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::Idle || self.role != NegotiationRole::Initiator {
            debug!(
                "Dropping negotiation-needed as {} in state {}",
                self.role, self.state
            );
            return Ok(());
        }
        self.create_offer().await
    }

    pub async fn add_remote_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<AddOutcome, IceApplyError> {
        self.candidates
            .add(candidate, self.transport.as_ref())
            .await
    }

    /// Tear down: discard buffered candidates and close the engine. Safe to
    /// call more than once.
    pub async fn close(&mut self) {
        if self.state == NegotiationState::Closed {
            return;
        }
        self.state = NegotiationState::Closed;
        self.candidates.discard();

        if let Err(e) = self.transport.close().await {
            warn!("Failed to close connection with {}: {}", self.remote_id, e);
        }
    }
}
