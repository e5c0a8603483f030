use pairlink_core::{CandidatePayload, IceCandidate, SdpPayload, SessionDescription};
use pairlink_peer::{NegotiationState, SignalEvent};

use crate::integration::init_tracing;
use crate::utils::TestPeer;

fn candidate(text: &str) -> IceCandidate {
    IceCandidate {
        candidate: text.to_owned(),
        sdp_mid: Some("0".to_owned()),
        sdp_m_line_index: Some(0),
    }
}

#[tokio::test]
async fn test_candidates_before_offer() {
    init_tracing();

    let mut b = TestPeer::new();
    let a_id = pairlink_core::PeerId::new();
    b.coordinator
        .handle_signal(SignalEvent::PeerJoined(a_id))
        .await;

    for text in ["c1", "c2", "c3"] {
        b.coordinator
            .handle_signal(SignalEvent::IceCandidate(CandidatePayload {
                target: b.id,
                candidate: candidate(text),
            }))
            .await;
    }

    let (transport, _) = b.factory.last();
    assert!(transport.calls().is_empty(), "nothing applied before the offer");
    assert_eq!(
        b.coordinator.context().unwrap().negotiation().pending_candidates(),
        3
    );

    b.coordinator
        .handle_signal(SignalEvent::Offer(SdpPayload {
            target: b.id,
            caller: a_id,
            sdp: SessionDescription::offer("v=0 remote"),
        }))
        .await;

    assert_eq!(
        transport.calls(),
        vec![
            "set_remote:Offer",
            "add_candidate:c1",
            "add_candidate:c2",
            "add_candidate:c3",
            "create_answer",
            "set_local:Answer",
        ]
    );

    // Later candidates go straight to the engine.
    b.coordinator
        .handle_signal(SignalEvent::IceCandidate(CandidatePayload {
            target: b.id,
            candidate: candidate("c4"),
        }))
        .await;

    let ctx = b.coordinator.context().unwrap();
    assert_eq!(ctx.state(), NegotiationState::Stable);
    assert_eq!(ctx.negotiation().pending_candidates(), 0);
    assert_eq!(transport.calls().last().map(String::as_str), Some("add_candidate:c4"));
}
