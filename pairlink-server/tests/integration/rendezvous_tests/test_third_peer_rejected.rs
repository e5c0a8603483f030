use pairlink_core::{RoomId, SignalMessage};
use std::time::Duration;

use crate::integration::{init_tracing, spawn_server, wait_for_members};
use crate::utils::TestClient;

#[tokio::test]
async fn test_third_peer_rejected() {
    init_tracing();
    let (addr, service) = spawn_server().await;

    let mut a = TestClient::connect(addr).await.unwrap();
    let mut b = TestClient::connect(addr).await.unwrap();
    let mut c = TestClient::connect(addr).await.unwrap();

    a.join("abc123").await.unwrap();
    wait_for_members(&service, "abc123", 1).await;
    b.join("abc123").await.unwrap();
    wait_for_members(&service, "abc123", 2).await;
    a.recv().await.unwrap();
    b.recv().await.unwrap();

    c.join("abc123").await.unwrap();

    assert_eq!(
        c.recv().await.unwrap(),
        SignalMessage::RoomFull(RoomId::from("abc123"))
    );
    assert!(a.expect_silence(Duration::from_millis(100)).await);
    assert!(b.expect_silence(Duration::from_millis(100)).await);
    assert_eq!(service.room_members(&RoomId::from("abc123")), vec![a.id, b.id]);
}
