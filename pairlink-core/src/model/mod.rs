mod peer;
mod room;
mod signaling;

pub use peer::{ParseIdError, PeerId};
pub use room::RoomId;
pub use signaling::{
    CandidatePayload, IceCandidate, IceServerConfig, SdpKind, SdpPayload, SessionDescription,
    SignalKind, SignalMessage,
};
