use pairlink_core::{RoomId, SignalMessage};

use crate::integration::{init_tracing, spawn_server, wait_for_members};
use crate::utils::TestClient;

#[tokio::test]
async fn test_peer_left_notified() {
    init_tracing();
    let (addr, service) = spawn_server().await;

    let mut a = TestClient::connect(addr).await.unwrap();
    let mut b = TestClient::connect(addr).await.unwrap();
    a.join("abc123").await.unwrap();
    wait_for_members(&service, "abc123", 1).await;
    b.join("abc123").await.unwrap();
    a.recv().await.unwrap();
    b.recv().await.unwrap();

    let a_id = a.id;
    a.close().await.unwrap();

    assert_eq!(b.recv().await.unwrap(), SignalMessage::PeerLeft(a_id));
    assert_eq!(service.room_members(&RoomId::from("abc123")), vec![b.id]);

    // The freed seat can be taken again.
    let mut c = TestClient::connect(addr).await.unwrap();
    c.join("abc123").await.unwrap();
    assert_eq!(
        b.recv().await.unwrap(),
        SignalMessage::PeerAbsentNowPresent(c.id)
    );
    assert_eq!(c.recv().await.unwrap(), SignalMessage::PeerJoined(b.id));
}
