use pairlink_core::PeerId;
use tokio::time::Instant;

use crate::channel::DataChannelSession;
use crate::negotiation::{NegotiationEngine, NegotiationRole, NegotiationState};
use crate::transport::{ContextId, IceConnectionState};

/// Everything that belongs to one attempt at connecting to one peer.
///
/// Owned exclusively by the coordinator. Dropped on teardown, never reused.
pub struct PeerConnectionContext {
    id: ContextId,
    negotiation: NegotiationEngine,
    channel: Option<DataChannelSession>,
    ice_state: IceConnectionState,
    deadline: Instant,
    stable_reported: bool,
}

impl PeerConnectionContext {
    pub fn new(id: ContextId, negotiation: NegotiationEngine, deadline: Instant) -> Self {
        Self {
            id,
            negotiation,
            channel: None,
            ice_state: IceConnectionState::New,
            deadline,
            stable_reported: false,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn peer(&self) -> PeerId {
        self.negotiation.remote_id()
    }

    pub fn role(&self) -> NegotiationRole {
        self.negotiation.role()
    }

    pub fn state(&self) -> NegotiationState {
        self.negotiation.state()
    }

    pub fn is_stable(&self) -> bool {
        self.state() == NegotiationState::Stable
    }

    pub fn negotiation(&self) -> &NegotiationEngine {
        &self.negotiation
    }

    pub fn negotiation_mut(&mut self) -> &mut NegotiationEngine {
        &mut self.negotiation
    }

    pub fn channel(&self) -> Option<&DataChannelSession> {
        self.channel.as_ref()
    }

    pub fn channel_mut(&mut self) -> Option<&mut DataChannelSession> {
        self.channel.as_mut()
    }

    pub fn attach_channel(&mut self, channel: DataChannelSession) {
        self.channel = Some(channel);
    }

    pub fn ice_state(&self) -> IceConnectionState {
        self.ice_state
    }

    pub fn set_ice_state(&mut self, state: IceConnectionState) {
        self.ice_state = state;
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Returns true exactly once, the first time the context is seen stable.
    pub(crate) fn take_stable_transition(&mut self) -> bool {
        if self.stable_reported || !self.is_stable() {
            return false;
        }
        self.stable_reported = true;
        true
    }

    /// Close the channel, then the engine. Buffered candidates are discarded.
    pub async fn close(&mut self) {
        if let Some(channel) = self.channel.as_mut() {
            channel.close().await;
        }
        self.negotiation.close().await;
    }
}
