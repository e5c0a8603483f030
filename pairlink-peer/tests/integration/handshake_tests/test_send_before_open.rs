use pairlink_core::PeerId;
use pairlink_peer::{ChannelNotOpenError, ChannelState, SendError, SignalEvent};

use crate::integration::init_tracing;
use crate::utils::TestPeer;

#[tokio::test]
async fn test_send_before_open() {
    init_tracing();
    let mut a = TestPeer::new();

    let err = a.coordinator.send("anyone?".to_owned()).await.unwrap_err();
    assert!(matches!(
        err,
        SendError::NotOpen(ChannelNotOpenError {
            state: ChannelState::Closed
        })
    ));

    a.coordinator
        .handle_signal(SignalEvent::PeerAbsentNowPresent(PeerId::new()))
        .await;

    let err = a.coordinator.send("too early".to_owned()).await.unwrap_err();
    assert!(matches!(
        err,
        SendError::NotOpen(ChannelNotOpenError {
            state: ChannelState::Connecting
        })
    ));

    let (transport, _) = a.factory.last();
    assert!(transport.channels()[0].sent().is_empty());
    assert!(a.coordinator.log().is_empty());
}
