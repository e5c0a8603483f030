use pairlink_core::{PeerId, SdpPayload, SessionDescription};
use pairlink_peer::{CloseReason, NegotiationState, SessionEvent, SignalEvent};

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_disconnect_during_offer() {
    init_tracing();
    let mut a = TestPeer::new();
    let b_id = PeerId::new();

    a.coordinator
        .handle_signal(SignalEvent::PeerAbsentNowPresent(b_id))
        .await;
    assert_eq!(
        a.coordinator.context().unwrap().state(),
        NegotiationState::HaveLocalOffer
    );

    a.coordinator.handle_signal(SignalEvent::Disconnected).await;

    assert!(a.coordinator.context().is_none());
    assert!(a.coordinator.is_stopped());

    let (transport, _) = a.factory.last();
    assert!(transport.is_closed());
    assert!(transport.channels()[0].is_closed());
    let calls_at_teardown = transport.calls().len();

    // A late answer finds nothing to act on.
    a.coordinator
        .handle_signal(SignalEvent::Answer(SdpPayload {
            target: a.id,
            caller: b_id,
            sdp: SessionDescription::answer("v=0 late"),
        }))
        .await;
    assert_eq!(transport.calls().len(), calls_at_teardown);

    let events = a.drain_events();
    assert_eq!(
        &events[1..],
        &[
            SessionEvent::SignalingLost,
            SessionEvent::ContextClosed {
                peer: b_id,
                reason: CloseReason::SignalingLost,
            },
        ]
    );
}
