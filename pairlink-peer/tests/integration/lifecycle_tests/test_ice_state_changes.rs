use pairlink_core::PeerId;
use pairlink_peer::transport::{IceConnectionState, TransportEvent};
use pairlink_peer::{CloseReason, SessionEvent, SignalEvent};

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_ice_disconnected_is_recorded() {
    init_tracing();
    let mut a = TestPeer::new();
    let b_id = PeerId::new();

    a.coordinator
        .handle_signal(SignalEvent::PeerAbsentNowPresent(b_id))
        .await;
    let ctx = a.context_id();
    a.drain_events();

    a.coordinator
        .handle_transport_event(
            ctx,
            TransportEvent::ConnectionStateChanged(IceConnectionState::Disconnected),
        )
        .await;

    let context = a.coordinator.context().expect("disconnected may recover");
    assert_eq!(context.ice_state(), IceConnectionState::Disconnected);
    assert!(a.drain_events().is_empty());

    let (transport, _) = a.factory.last();
    assert!(!transport.is_closed());
}

#[tokio::test]
async fn test_ice_failed_closes_context() {
    init_tracing();
    let mut a = TestPeer::new();
    let b_id = PeerId::new();

    a.coordinator
        .handle_signal(SignalEvent::PeerAbsentNowPresent(b_id))
        .await;
    let ctx = a.context_id();
    a.drain_events();

    a.coordinator
        .handle_transport_event(
            ctx,
            TransportEvent::ConnectionStateChanged(IceConnectionState::Failed),
        )
        .await;

    assert!(a.coordinator.context().is_none());
    assert!(!a.coordinator.is_stopped());
    assert_eq!(
        a.drain_events(),
        vec![SessionEvent::ContextClosed {
            peer: b_id,
            reason: CloseReason::IceFailed,
        }]
    );

    let (transport, _) = a.factory.last();
    assert!(transport.is_closed());
    assert!(transport.channels()[0].is_closed());
}
