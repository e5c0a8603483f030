use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use pairlink_core::{PeerId, RoomId, SignalMessage};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Raw signaling client speaking the wire protocol directly.
pub struct TestClient {
    pub id: PeerId,
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect and consume the `welcome` frame.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (socket, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .context("Failed to connect test client")?;

        let mut client = Self {
            id: PeerId::new(),
            socket,
        };
        match client.recv().await? {
            SignalMessage::Welcome(id) => client.id = id,
            other => bail!("expected welcome, got {:?}", other),
        }
        Ok(client)
    }

    pub async fn send(&mut self, msg: SignalMessage) -> Result<()> {
        self.socket.send(Message::Text(msg.to_json()?.into())).await?;
        Ok(())
    }

    pub async fn join(&mut self, room: &str) -> Result<()> {
        self.send(SignalMessage::JoinRoom(RoomId::from(room))).await
    }

    pub async fn recv(&mut self) -> Result<SignalMessage> {
        loop {
            let frame = tokio::time::timeout(RECV_TIMEOUT, self.socket.next())
                .await
                .context("Timed out waiting for a signaling frame")?;

            match frame {
                Some(Ok(Message::Text(text))) => return Ok(SignalMessage::from_json(text.as_str())?),
                Some(Ok(Message::Close(_))) | None => bail!("socket closed"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    /// True when nothing arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) -> bool {
        tokio::time::timeout(window, self.socket.next()).await.is_err()
    }

    pub async fn close(mut self) -> Result<()> {
        self.socket.close(None).await?;
        Ok(())
    }
}
