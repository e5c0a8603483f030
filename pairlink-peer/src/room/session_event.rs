use pairlink_core::{PeerId, RoomId};
use std::fmt;

use crate::message::Message;
use crate::negotiation::NegotiationRole;

/// Why a peer connection context was torn down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    Left,
    PeerLeft,
    SignalingLost,
    Timeout,
    NegotiationFailed(String),
    IceFailed,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left the room"),
            Self::PeerLeft => f.write_str("peer left the room"),
            Self::SignalingLost => f.write_str("signaling connection lost"),
            Self::Timeout => f.write_str("negotiation timed out"),
            Self::NegotiationFailed(reason) => write!(f, "negotiation failed: {reason}"),
            Self::IceFailed => f.write_str("ICE connectivity failed"),
        }
    }
}

/// Status updates published by the coordinator for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    RoleAssigned { peer: PeerId, role: NegotiationRole },
    Stable { peer: PeerId },
    ChannelOpen { peer: PeerId },
    ChannelClosed { peer: PeerId },
    MessageReceived(Message),
    MessageSent(Message),
    ContextClosed { peer: PeerId, reason: CloseReason },
    RoomFull(RoomId),
    SignalingLost,
}
