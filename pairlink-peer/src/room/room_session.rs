use pairlink_core::{PeerId, RoomId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::PeerConfig;
use crate::error::{NetworkError, SendError};
use crate::message::{Message, MessageLog};
use crate::room::{CoordinatorHandle, RoomCoordinator, SessionEvent};
use crate::signaling::{SignalEvent, SignalingClient};
use crate::transport::{TransportFactory, WebRtcFactory};

/// A joined room: signaling connection, coordinator task and its event stream.
pub struct RoomSession {
    room: RoomId,
    local_id: PeerId,
    signaling: SignalingClient,
    handle: CoordinatorHandle,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    task: JoinHandle<()>,
}

impl RoomSession {
    /// Connect to the signaling service and join `room` over real WebRTC.
    pub async fn join(config: &PeerConfig, room: RoomId) -> Result<Self, NetworkError> {
        let factory = Arc::new(WebRtcFactory::new(config.transport.clone()));
        Self::join_with(config, room, factory).await
    }

    pub async fn join_with(
        config: &PeerConfig,
        room: RoomId,
        factory: Arc<dyn TransportFactory>,
    ) -> Result<Self, NetworkError> {
        let (signaling, signal_rx) = SignalingClient::connect(&config.signaling_url).await?;
        Self::start(config, room, signaling, signal_rx, factory)
    }

    /// Send `join-room` over an already connected client and start the
    /// coordinator. Nothing is spawned when the join cannot be sent.
    pub fn start(
        config: &PeerConfig,
        room: RoomId,
        signaling: SignalingClient,
        signal_rx: mpsc::UnboundedReceiver<SignalEvent>,
        factory: Arc<dyn TransportFactory>,
    ) -> Result<Self, NetworkError> {
        // Events that arrive before the coordinator runs wait in `signal_rx`.
        signaling.join_room(&room)?;

        let local_id = signaling.local_id();
        let (command_tx, command_rx) = mpsc::channel(32);

        let (coordinator, events) = RoomCoordinator::new(
            room.clone(),
            local_id,
            config.coordinator(),
            Arc::new(signaling.clone()),
            factory,
            signal_rx,
            command_rx,
        );
        let handle = CoordinatorHandle::new(command_tx, coordinator.log().clone());
        let task = tokio::spawn(coordinator.run());

        Ok(Self {
            room,
            local_id,
            signaling,
            handle,
            events,
            task,
        })
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn local_id(&self) -> PeerId {
        self.local_id
    }

    pub fn handle(&self) -> CoordinatorHandle {
        self.handle.clone()
    }

    pub fn log(&self) -> &MessageLog {
        self.handle.log()
    }

    /// Next status update. `None` once the coordinator has stopped.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    pub async fn send(&self, text: impl Into<String>) -> Result<Message, SendError> {
        self.handle.send(text).await
    }

    pub async fn leave(self) {
        self.handle.leave().await;
        if let Err(e) = self.task.await {
            warn!("Coordinator task ended abnormally: {}", e);
        }
        self.signaling.disconnect();
        info!("Left room {}", self.room);
    }
}
