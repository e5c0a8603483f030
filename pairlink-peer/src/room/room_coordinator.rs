use pairlink_core::utils::CHAT_CHANNEL_LABEL;
use pairlink_core::{CandidatePayload, PeerId, RoomId, SdpPayload};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::channel::{ChannelState, DataChannelSession};
use crate::error::{ChannelNotOpenError, NegotiationError, SendError};
use crate::message::{Message, MessageLog};
use crate::negotiation::{NegotiationEngine, NegotiationRole};
use crate::room::{CloseReason, PeerConnectionContext, RoomCommand, SessionEvent};
use crate::signaling::{SignalEvent, SignalingOutput};
use crate::transport::{
    ContextId, IceConnectionState, TransportEvent, TransportEventSink, TransportFactory,
};

pub const DEFAULT_NEGOTIATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Time allowed from role assignment until the context is stable.
    pub negotiation_timeout: Duration,
    pub channel_label: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            negotiation_timeout: DEFAULT_NEGOTIATION_TIMEOUT,
            channel_label: CHAT_CHANNEL_LABEL.to_owned(),
        }
    }
}

/// Owns the session state of one room membership.
///
/// Signaling events, engine events, user commands and the negotiation
/// deadline all funnel into [`run`](Self::run), so the context is only ever
/// touched from one task.
pub struct RoomCoordinator {
    room: RoomId,
    local_id: PeerId,
    config: CoordinatorConfig,
    signaling: Arc<dyn SignalingOutput>,
    factory: Arc<dyn TransportFactory>,
    context: Option<PeerConnectionContext>,
    next_context: u64,
    log: MessageLog,
    signal_rx: mpsc::UnboundedReceiver<SignalEvent>,
    command_rx: mpsc::Receiver<RoomCommand>,
    transport_rx: mpsc::Receiver<(ContextId, TransportEvent)>,
    transport_tx: mpsc::Sender<(ContextId, TransportEvent)>,
    events: mpsc::UnboundedSender<SessionEvent>,
    signaling_lost: bool,
    stopped: bool,
}

impl RoomCoordinator {
    pub fn new(
        room: RoomId,
        local_id: PeerId,
        config: CoordinatorConfig,
        signaling: Arc<dyn SignalingOutput>,
        factory: Arc<dyn TransportFactory>,
        signal_rx: mpsc::UnboundedReceiver<SignalEvent>,
        command_rx: mpsc::Receiver<RoomCommand>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (transport_tx, transport_rx) = mpsc::channel(256);
        let (events, events_rx) = mpsc::unbounded_channel();

        let coordinator = Self {
            room,
            local_id,
            config,
            signaling,
            factory,
            context: None,
            next_context: 1,
            log: MessageLog::new(),
            signal_rx,
            command_rx,
            transport_rx,
            transport_tx,
            events,
            signaling_lost: false,
            stopped: false,
        };
        (coordinator, events_rx)
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn local_id(&self) -> PeerId {
        self.local_id
    }

    pub fn context(&self) -> Option<&PeerConnectionContext> {
        self.context.as_ref()
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Whether the loop has nothing left to do: the user left, the room was
    /// full, or signaling was lost with no established connection.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub async fn run(mut self) {
        info!("Coordinator for room {} started as {}", self.room, self.local_id);

        while !self.stopped {
            let deadline = self.pending_deadline();

            tokio::select! {
                evt = self.signal_rx.recv(), if !self.signaling_lost => {
                    let event = evt.unwrap_or(SignalEvent::Disconnected);
                    self.handle_signal(event).await;
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(RoomCommand::Send { text, reply }) => {
                            let _ = reply.send(self.send(text).await);
                        }
                        Some(RoomCommand::Leave) => self.leave().await,
                        None => {
                            info!("Command channel closed. Leaving room.");
                            self.leave().await;
                        }
                    }
                }

                Some((context, event)) = self.transport_rx.recv() => {
                    self.handle_transport_event(context, event).await;
                }

                _ = sleep_until(deadline) => self.expire().await,
            }
        }

        info!("Coordinator for room {} finished", self.room);
    }

    pub async fn handle_signal(&mut self, event: SignalEvent) {
        match event {
            SignalEvent::PeerAbsentNowPresent(peer) => {
                self.assign_role(peer, NegotiationRole::Initiator).await
            }
            SignalEvent::PeerJoined(peer) => {
                self.assign_role(peer, NegotiationRole::Responder).await
            }
            SignalEvent::PeerLeft(peer) => {
                if self.context.as_ref().is_some_and(|c| c.peer() == peer) {
                    self.teardown(CloseReason::PeerLeft).await;
                } else {
                    debug!("Ignoring departure of unrelated peer {}", peer);
                }
            }
            SignalEvent::RoomFull(room) => {
                warn!("Room {} already has two members", room);
                let _ = self.events.send(SessionEvent::RoomFull(room));
                self.stopped = true;
            }
            SignalEvent::Offer(payload) => self.on_offer(payload).await,
            SignalEvent::Answer(payload) => self.on_answer(payload).await,
            SignalEvent::IceCandidate(payload) => self.on_remote_candidate(payload).await,
            SignalEvent::Disconnected => self.on_signaling_lost().await,
        }
    }

    pub async fn handle_transport_event(&mut self, id: ContextId, event: TransportEvent) {
        let Some(ctx) = self.context.as_mut() else {
            debug!("{}: no active context, dropping {:?}", id, event);
            return;
        };
        if ctx.id() != id {
            debug!("{}: stale event {:?} (active is {})", id, event, ctx.id());
            return;
        }

        match event {
            TransportEvent::CandidateDiscovered(candidate) => {
                let peer = ctx.peer();
                if let Err(e) = self.signaling.send_ice(peer, candidate).await {
                    warn!("Failed to send ICE candidate to {}: {}", peer, e);
                }
            }

            TransportEvent::NegotiationNeeded => {
                let result = ctx.negotiation_mut().handle_negotiation_needed().await;
                self.after_negotiation_step(result).await;
            }

            TransportEvent::ConnectionStateChanged(state) => {
                ctx.set_ice_state(state);
                if state == IceConnectionState::Failed {
                    self.teardown(CloseReason::IceFailed).await;
                }
            }

            TransportEvent::IncomingChannel(channel) => {
                if ctx.role() != NegotiationRole::Responder || ctx.channel().is_some() {
                    warn!(
                        "{}: ignoring unexpected incoming channel '{}'",
                        id,
                        channel.label()
                    );
                    return;
                }
                info!("{}: incoming data channel '{}'", id, channel.label());
                let session = DataChannelSession::new(channel, ctx.peer(), self.log.clone());
                ctx.attach_channel(session);
            }

            TransportEvent::ChannelOpen => {
                let peer = ctx.peer();
                let Some(channel) = ctx.channel_mut() else {
                    warn!("{}: open event without a channel", id);
                    return;
                };
                channel.mark_open();
                let _ = self.events.send(SessionEvent::ChannelOpen { peer });
            }

            TransportEvent::ChannelMessage(data) => {
                let Some(channel) = ctx.channel() else {
                    warn!("{}: message without a channel", id);
                    return;
                };
                let message = channel.receive(data);
                let _ = self.events.send(SessionEvent::MessageReceived(message));
            }

            TransportEvent::ChannelClosed => {
                let peer = ctx.peer();
                if let Some(channel) = ctx.channel_mut() {
                    channel.mark_closed();
                }
                let _ = self.events.send(SessionEvent::ChannelClosed { peer });
            }
        }
    }

    /// Send `text` to the peer. Refused unless the channel is open.
    pub async fn send(&mut self, text: String) -> Result<Message, SendError> {
        let Some(ctx) = self.context.as_ref() else {
            return Err(ChannelNotOpenError {
                state: ChannelState::Closed,
            }
            .into());
        };
        let Some(channel) = ctx.channel() else {
            return Err(ChannelNotOpenError {
                state: ChannelState::Connecting,
            }
            .into());
        };

        let message = channel.send(text).await?;
        let _ = self.events.send(SessionEvent::MessageSent(message.clone()));
        Ok(message)
    }

    pub async fn leave(&mut self) {
        info!("Leaving room {}", self.room);
        self.teardown(CloseReason::Left).await;
        self.stopped = true;
    }

    async fn assign_role(&mut self, peer: PeerId, role: NegotiationRole) {
        if let Some(ctx) = &self.context {
            warn!(
                "Ignoring {} role for {}: already paired with {}",
                role,
                peer,
                ctx.peer()
            );
            return;
        }
        if peer == self.local_id {
            warn!("Ignoring role event naming ourselves");
            return;
        }

        let id = ContextId(self.next_context);
        self.next_context += 1;

        let sink = TransportEventSink::new(id, self.transport_tx.clone());
        let transport = match self.factory.connect(sink).await {
            Ok(t) => t,
            Err(e) => {
                error!("{}: failed to create transport for {}: {}", id, peer, e);
                let reason = CloseReason::NegotiationFailed(e.to_string());
                let _ = self.events.send(SessionEvent::ContextClosed { peer, reason });
                return;
            }
        };

        let engine = NegotiationEngine::new(
            role,
            self.local_id,
            peer,
            transport.clone(),
            self.signaling.clone(),
        );
        let deadline = Instant::now() + self.config.negotiation_timeout;
        let mut ctx = PeerConnectionContext::new(id, engine, deadline);

        info!("{}: {} towards {}", id, role, peer);
        let _ = self.events.send(SessionEvent::RoleAssigned { peer, role });

        if role == NegotiationRole::Responder {
            self.context = Some(ctx);
            return;
        }

        // The channel has to exist before the offer so that it is described in it.
        let channel = transport.create_data_channel(&self.config.channel_label).await;
        match channel {
            Ok(channel) => {
                ctx.attach_channel(DataChannelSession::new(channel, peer, self.log.clone()));
                self.context = Some(ctx);
            }
            Err(e) => {
                self.context = Some(ctx);
                self.teardown(CloseReason::NegotiationFailed(e.to_string()))
                    .await;
                return;
            }
        }

        let Some(ctx) = self.context.as_mut() else {
            return;
        };
        let result = ctx.negotiation_mut().create_offer().await;
        self.after_negotiation_step(result).await;
    }

    async fn on_offer(&mut self, payload: SdpPayload) {
        let Some(ctx) = self.context.as_mut() else {
            debug!("Ignoring offer from {}: no active context", payload.caller);
            return;
        };
        if payload.caller != ctx.peer() || payload.target != self.local_id {
            warn!(
                "{}: ignoring offer from {} (paired with {})",
                ctx.id(),
                payload.caller,
                ctx.peer()
            );
            return;
        }

        let result = ctx
            .negotiation_mut()
            .handle_offer(payload.sdp, payload.caller)
            .await;
        self.after_negotiation_step(result).await;
    }

    async fn on_answer(&mut self, payload: SdpPayload) {
        let Some(ctx) = self.context.as_mut() else {
            debug!("Ignoring answer from {}: no active context", payload.caller);
            return;
        };
        if payload.caller != ctx.peer() || payload.target != self.local_id {
            warn!(
                "{}: ignoring answer from {} (paired with {})",
                ctx.id(),
                payload.caller,
                ctx.peer()
            );
            return;
        }

        let result = ctx.negotiation_mut().handle_answer(payload.sdp).await;
        self.after_negotiation_step(result).await;
    }

    async fn on_remote_candidate(&mut self, payload: CandidatePayload) {
        if payload.target != self.local_id {
            debug!("Ignoring ICE candidate addressed to {}", payload.target);
            return;
        }
        let Some(ctx) = self.context.as_mut() else {
            debug!("Ignoring ICE candidate: no active context");
            return;
        };

        match ctx
            .negotiation_mut()
            .add_remote_candidate(payload.candidate)
            .await
        {
            Ok(outcome) => debug!("{}: remote candidate {:?}", ctx.id(), outcome),
            Err(e) => warn!("{}: {}", ctx.id(), e),
        }
    }

    async fn on_signaling_lost(&mut self) {
        if self.signaling_lost {
            return;
        }
        self.signaling_lost = true;
        warn!("Lost connection to signaling service");
        let _ = self.events.send(SessionEvent::SignalingLost);

        match &self.context {
            Some(ctx) if ctx.is_stable() => {
                info!("{}: keeping established connection", ctx.id());
            }
            Some(_) => {
                self.teardown(CloseReason::SignalingLost).await;
                self.stopped = true;
            }
            None => self.stopped = true,
        }
    }

    async fn after_negotiation_step(&mut self, result: Result<(), NegotiationError>) {
        match result {
            Ok(()) => {
                let Some(ctx) = self.context.as_mut() else {
                    return;
                };
                if ctx.take_stable_transition() {
                    let peer = ctx.peer();
                    info!("{}: negotiation with {} is stable", ctx.id(), peer);
                    let _ = self.events.send(SessionEvent::Stable { peer });
                }
            }
            Err(e) if e.is_fatal() => {
                error!("Negotiation failed: {}", e);
                self.teardown(CloseReason::NegotiationFailed(e.to_string()))
                    .await;
            }
            Err(e) => warn!("Negotiation step skipped: {}", e),
        }
    }

    fn pending_deadline(&self) -> Option<Instant> {
        self.context
            .as_ref()
            .filter(|ctx| !ctx.is_stable())
            .map(|ctx| ctx.deadline())
    }

    async fn expire(&mut self) {
        let Some(ctx) = &self.context else {
            return;
        };
        let err = NegotiationError::Timeout(self.config.negotiation_timeout);
        error!("{}: {} with {}", ctx.id(), err, ctx.peer());
        self.teardown(CloseReason::Timeout).await;
    }

    async fn teardown(&mut self, reason: CloseReason) {
        let Some(mut ctx) = self.context.take() else {
            return;
        };
        let peer = ctx.peer();
        info!("{}: closing connection with {}: {}", ctx.id(), peer, reason);

        ctx.close().await;
        let _ = self.events.send(SessionEvent::ContextClosed { peer, reason });
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Cloneable front end to a running coordinator.
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::Sender<RoomCommand>,
    log: MessageLog,
}

impl CoordinatorHandle {
    pub fn new(commands: mpsc::Sender<RoomCommand>, log: MessageLog) -> Self {
        Self { commands, log }
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub async fn send(&self, text: impl Into<String>) -> Result<Message, SendError> {
        let gone = || {
            SendError::from(ChannelNotOpenError {
                state: ChannelState::Closed,
            })
        };

        let (reply, rx) = oneshot::channel();
        self.commands
            .send(RoomCommand::Send {
                text: text.into(),
                reply,
            })
            .await
            .map_err(|_| gone())?;
        rx.await.map_err(|_| gone())?
    }

    pub async fn leave(&self) {
        let _ = self.commands.send(RoomCommand::Leave).await;
    }
}
