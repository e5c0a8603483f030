use bytes::Bytes;
use pairlink_peer::transport::TransportEvent;
use pairlink_peer::{ChannelState, NegotiationRole, NegotiationState, SessionEvent, Sender, SignalEvent};
use std::sync::Arc;

use crate::integration::init_tracing;
use crate::utils::{MockChannel, TestPeer, relay};

#[tokio::test]
async fn test_abc123_handshake() {
    init_tracing();

    let mut a = TestPeer::new();
    let mut b = TestPeer::new();

    // B was waiting in the room, A arrives.
    a.coordinator
        .handle_signal(SignalEvent::PeerAbsentNowPresent(b.id))
        .await;
    b.coordinator
        .handle_signal(SignalEvent::PeerJoined(a.id))
        .await;

    assert_eq!(relay(&a.signaling, &mut b.coordinator).await, 1, "offer");
    assert_eq!(relay(&b.signaling, &mut a.coordinator).await, 1, "answer");

    let a_ctx = a.coordinator.context().unwrap();
    let b_ctx = b.coordinator.context().unwrap();
    assert_eq!(a_ctx.role(), NegotiationRole::Initiator);
    assert_eq!(b_ctx.role(), NegotiationRole::Responder);
    assert_eq!(a_ctx.state(), NegotiationState::Stable);
    assert_eq!(b_ctx.state(), NegotiationState::Stable);

    // The engine surfaces the channel on B and opens both ends.
    let (a_id, b_id) = (a.context_id(), b.context_id());
    b.coordinator
        .handle_transport_event(
            b_id,
            TransportEvent::IncomingChannel(Arc::new(MockChannel::new("chat"))),
        )
        .await;
    a.coordinator
        .handle_transport_event(a_id, TransportEvent::ChannelOpen)
        .await;
    b.coordinator
        .handle_transport_event(b_id, TransportEvent::ChannelOpen)
        .await;

    let a_channel = a.coordinator.context().unwrap().channel().unwrap();
    assert_eq!(a_channel.state(), ChannelState::Open);
    assert_eq!(a_channel.label(), "chat");
    assert!(b.coordinator.context().unwrap().channel().unwrap().is_open());

    a.coordinator.send("hello".to_owned()).await.unwrap();

    let (a_transport, _) = a.factory.last();
    let wire = a_transport.channels()[0].sent();
    assert_eq!(wire, vec!["hello".to_owned()]);

    b.coordinator
        .handle_transport_event(b_id, TransportEvent::ChannelMessage(Bytes::from(wire[0].clone())))
        .await;

    let b_log = b.coordinator.log().all();
    assert_eq!(b_log.len(), 1);
    assert_eq!(b_log[0].from, Sender::Peer(a.id));
    assert_eq!(b_log[0].value, "hello");

    let a_log = a.coordinator.log().all();
    assert_eq!(a_log.len(), 1);
    assert!(a_log[0].is_local());

    let b_events = b.drain_events();
    assert!(b_events.contains(&SessionEvent::Stable { peer: a.id }));
    assert!(matches!(
        b_events.last(),
        Some(SessionEvent::MessageReceived(m)) if m.value == "hello"
    ));
}
