use pairlink_core::{CandidatePayload, PeerId, RoomId, SdpPayload, SignalKind, SignalMessage};

/// What the rendezvous service can tell a client once the handshake is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalEvent {
    /// A peer joined after us: we initiate.
    PeerAbsentNowPresent(PeerId),
    /// We joined after this peer: we respond.
    PeerJoined(PeerId),
    PeerLeft(PeerId),
    RoomFull(RoomId),
    Offer(SdpPayload),
    Answer(SdpPayload),
    IceCandidate(CandidatePayload),
    /// The socket is gone. Delivered once, always last.
    Disconnected,
}

impl SignalEvent {
    pub fn kind(&self) -> Option<SignalKind> {
        Some(match self {
            Self::PeerAbsentNowPresent(_) => SignalKind::PeerAbsentNowPresent,
            Self::PeerJoined(_) => SignalKind::PeerJoined,
            Self::PeerLeft(_) => SignalKind::PeerLeft,
            Self::RoomFull(_) => SignalKind::RoomFull,
            Self::Offer(_) => SignalKind::Offer,
            Self::Answer(_) => SignalKind::Answer,
            Self::IceCandidate(_) => SignalKind::IceCandidate,
            Self::Disconnected => return None,
        })
    }
}

impl TryFrom<SignalMessage> for SignalEvent {
    /// Messages a service never sends to a client after the handshake.
    type Error = SignalMessage;

    fn try_from(msg: SignalMessage) -> Result<Self, Self::Error> {
        match msg {
            SignalMessage::PeerAbsentNowPresent(peer) => Ok(Self::PeerAbsentNowPresent(peer)),
            SignalMessage::PeerJoined(peer) => Ok(Self::PeerJoined(peer)),
            SignalMessage::PeerLeft(peer) => Ok(Self::PeerLeft(peer)),
            SignalMessage::RoomFull(room) => Ok(Self::RoomFull(room)),
            SignalMessage::Offer(payload) => Ok(Self::Offer(payload)),
            SignalMessage::Answer(payload) => Ok(Self::Answer(payload)),
            SignalMessage::IceCandidate(payload) => Ok(Self::IceCandidate(payload)),
            other @ (SignalMessage::JoinRoom(_) | SignalMessage::Welcome(_)) => Err(other),
        }
    }
}
