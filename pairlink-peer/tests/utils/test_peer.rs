use pairlink_core::{PeerId, RoomId};
use pairlink_peer::room::{CoordinatorConfig, RoomCommand};
use pairlink_peer::transport::ContextId;
use pairlink_peer::{RoomCoordinator, SessionEvent, SignalEvent};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::utils::{MockFactory, MockSignalingOutput};

/// A coordinator wired to mocks, driven step by step from the test.
pub struct TestPeer {
    pub id: PeerId,
    pub coordinator: RoomCoordinator,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    pub signaling: Arc<MockSignalingOutput>,
    pub factory: Arc<MockFactory>,
    pub signal_tx: mpsc::UnboundedSender<SignalEvent>,
    pub command_tx: mpsc::Sender<RoomCommand>,
}

impl TestPeer {
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::default())
    }

    pub fn with_config(config: CoordinatorConfig) -> Self {
        let id = PeerId::new();
        let signaling = Arc::new(MockSignalingOutput::default());
        let factory = Arc::new(MockFactory::default());
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(16);

        let (coordinator, events) = RoomCoordinator::new(
            RoomId::from("abc123"),
            id,
            config,
            signaling.clone(),
            factory.clone(),
            signal_rx,
            command_rx,
        );

        Self {
            id,
            coordinator,
            events,
            signaling,
            factory,
            signal_tx,
            command_tx,
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.coordinator
            .context()
            .expect("no active context")
            .id()
    }

    /// Session events published so far.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}
