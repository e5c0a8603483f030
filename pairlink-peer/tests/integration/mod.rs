pub mod lifecycle_tests;

use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Start a rendezvous service on an ephemeral loopback port.
pub async fn spawn_server() -> (String, pairlink_server::SignalingService) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    let service = pairlink_server::SignalingService::new();

    tokio::spawn({
        let service = service.clone();
        async move {
            let _ = pairlink_server::serve(listener, service).await;
        }
    });

    (format!("ws://{addr}/ws"), service)
}

pub async fn wait_for_members(service: &pairlink_server::SignalingService, room: &str, count: usize) {
    let room = pairlink_core::RoomId::from(room);
    for _ in 0..100 {
        if service.room_members(&room).len() == count {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("room {room} never reached {count} members");
}
