use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

/// SDP blob produced by the connection engine and exchanged verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }
}

/// A proposed network path, in the browser's `RTCIceCandidateInit` shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SdpPayload {
    pub target: PeerId,
    pub caller: PeerId,
    pub sdp: SessionDescription,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidatePayload {
    pub target: PeerId,
    pub candidate: IceCandidate,
}

/// Every frame on the signaling socket: `{"kind": ..., "payload": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum SignalMessage {
    JoinRoom(RoomId),
    Welcome(PeerId),
    PeerAbsentNowPresent(PeerId),
    PeerJoined(PeerId),
    PeerLeft(PeerId),
    RoomFull(RoomId),
    Offer(SdpPayload),
    Answer(SdpPayload),
    IceCandidate(CandidatePayload),
}

/// Discriminant of [`SignalMessage`], used to subscribe to one kind of event.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum SignalKind {
    JoinRoom,
    Welcome,
    PeerAbsentNowPresent,
    PeerJoined,
    PeerLeft,
    RoomFull,
    Offer,
    Answer,
    IceCandidate,
}

impl SignalMessage {
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::JoinRoom(_) => SignalKind::JoinRoom,
            Self::Welcome(_) => SignalKind::Welcome,
            Self::PeerAbsentNowPresent(_) => SignalKind::PeerAbsentNowPresent,
            Self::PeerJoined(_) => SignalKind::PeerJoined,
            Self::PeerLeft(_) => SignalKind::PeerLeft,
            Self::RoomFull(_) => SignalKind::RoomFull,
            Self::Offer(_) => SignalKind::Offer,
            Self::Answer(_) => SignalKind::Answer,
            Self::IceCandidate(_) => SignalKind::IceCandidate,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JoinRoom => "join-room",
            Self::Welcome => "welcome",
            Self::PeerAbsentNowPresent => "peer-absent-now-present",
            Self::PeerJoined => "peer-joined",
            Self::PeerLeft => "peer-left",
            Self::RoomFull => "room-full",
            Self::Offer => "offer",
            Self::Answer => "answer",
            Self::IceCandidate => "ice-candidate",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
