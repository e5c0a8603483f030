use axum::extract::ws::Message;
use dashmap::DashMap;
use pairlink_core::{PeerId, RoomId, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Result of a `join-room` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// First member; nothing is announced until someone else arrives.
    Waiting,
    /// Second member, paired with the peer already waiting.
    Paired(PeerId),
    AlreadyMember,
    Full,
}

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
    rooms: DashMap<RoomId, Vec<PeerId>>,
    membership: DashMap<PeerId, RoomId>,
}

/// Relay-only rendezvous: pairs two peers per room and forwards their
/// negotiation messages. It never looks inside an SDP or a candidate.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalingService {
    pub const ROOM_CAPACITY: usize = 2;

    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                rooms: DashMap::new(),
                membership: DashMap::new(),
            }),
        }
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id, tx);
    }

    /// Forget the peer and let the rest of its room know.
    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.leave_room(peer_id);
        self.inner.peers.remove(peer_id);
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.len()
    }

    pub fn room_members(&self, room: &RoomId) -> Vec<PeerId> {
        self.inner
            .rooms
            .get(room)
            .map(|members| members.clone())
            .unwrap_or_default()
    }

    pub fn send_signal(&self, peer_id: PeerId, msg: SignalMessage) {
        let Some(peer) = self.inner.peers.get(&peer_id) else {
            warn!("Attempted to send {} to disconnected peer {}", msg.kind(), peer_id);
            return;
        };

        match msg.to_json() {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to queue WS message to {}: {}", peer_id, e);
                }
            }
            Err(e) => error!("Failed to serialize {} message: {}", msg.kind(), e),
        }
    }

    /// Route one decoded frame received from `sender`.
    pub fn handle_message(&self, sender: PeerId, msg: SignalMessage) {
        match msg {
            SignalMessage::JoinRoom(room) => {
                self.join_room(sender, room);
            }
            SignalMessage::Offer(_) | SignalMessage::Answer(_) | SignalMessage::IceCandidate(_) => {
                self.relay(sender, msg)
            }
            other => warn!("Peer {} sent service-only message {}", sender, other.kind()),
        }
    }

    pub fn join_room(&self, peer_id: PeerId, room: RoomId) -> JoinOutcome {
        let current = self.inner.membership.get(&peer_id).map(|r| r.clone());
        match current {
            Some(current) if current == room => {
                debug!("Peer {} is already in room {}", peer_id, room);
                return JoinOutcome::AlreadyMember;
            }
            Some(_) => self.leave_room(&peer_id),
            None => {}
        }

        let outcome = {
            let mut members = self.inner.rooms.entry(room.clone()).or_default();
            match members.first().copied() {
                _ if members.len() >= Self::ROOM_CAPACITY => JoinOutcome::Full,
                Some(existing) => {
                    members.push(peer_id);
                    JoinOutcome::Paired(existing)
                }
                None => {
                    members.push(peer_id);
                    JoinOutcome::Waiting
                }
            }
        };

        match &outcome {
            JoinOutcome::Waiting => {
                info!("Peer {} opened room {}", peer_id, room);
                self.inner.membership.insert(peer_id, room);
            }
            JoinOutcome::Paired(existing) => {
                info!("Peer {} joined room {} with {}", peer_id, room, existing);
                self.inner.membership.insert(peer_id, room);
                self.send_signal(*existing, SignalMessage::PeerAbsentNowPresent(peer_id));
                self.send_signal(peer_id, SignalMessage::PeerJoined(*existing));
            }
            JoinOutcome::Full => {
                warn!("Peer {} turned away from full room {}", peer_id, room);
                self.send_signal(peer_id, SignalMessage::RoomFull(room));
            }
            JoinOutcome::AlreadyMember => {}
        }

        outcome
    }

    fn leave_room(&self, peer_id: &PeerId) {
        let Some((_, room)) = self.inner.membership.remove(peer_id) else {
            return;
        };

        let remaining = match self.inner.rooms.get_mut(&room) {
            Some(mut members) => {
                members.retain(|p| p != peer_id);
                members.clone()
            }
            None => Vec::new(),
        };
        self.inner.rooms.remove_if(&room, |_, members| members.is_empty());

        info!("Peer {} left room {}", peer_id, room);
        for peer in remaining {
            self.send_signal(peer, SignalMessage::PeerLeft(*peer_id));
        }
    }

    fn relay(&self, sender: PeerId, msg: SignalMessage) {
        let (target, msg) = match msg {
            SignalMessage::Offer(mut payload) => {
                payload.caller = sender;
                (payload.target, SignalMessage::Offer(payload))
            }
            SignalMessage::Answer(mut payload) => {
                payload.caller = sender;
                (payload.target, SignalMessage::Answer(payload))
            }
            SignalMessage::IceCandidate(payload) => {
                (payload.target, SignalMessage::IceCandidate(payload))
            }
            other => {
                warn!("Refusing to relay {} from {}", other.kind(), sender);
                return;
            }
        };

        if !self.share_room(&sender, &target) {
            warn!(
                "Dropping {} from {} to {}: not in the same room",
                msg.kind(),
                sender,
                target
            );
            return;
        }

        debug!("Relaying {} from {} to {}", msg.kind(), sender, target);
        self.send_signal(target, msg);
    }

    fn share_room(&self, a: &PeerId, b: &PeerId) -> bool {
        if a == b {
            return false;
        }
        let room_a = self.inner.membership.get(a).map(|r| r.clone());
        let room_b = self.inner.membership.get(b).map(|r| r.clone());
        matches!((room_a, room_b), (Some(x), Some(y)) if x == y)
    }
}
