pub mod channel;
pub mod config;
pub mod error;
pub mod ice;
pub mod message;
pub mod negotiation;
pub mod room;
pub mod signaling;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use channel::{ChannelState, DataChannelSession};
pub use config::PeerConfig;
pub use error::{
    ChannelNotOpenError, IceApplyError, NegotiationError, NetworkError, SendError, TransportError,
};
pub use message::{Message, MessageLog, Sender};
pub use negotiation::{NegotiationEngine, NegotiationRole, NegotiationState};
pub use room::{
    CloseReason, CoordinatorConfig, CoordinatorHandle, RoomCoordinator, RoomSession, SessionEvent,
};
pub use signaling::{SignalEvent, SignalingClient, SignalingOutput};
