use async_trait::async_trait;
use dashmap::DashMap;
use futures::{SinkExt, Stream, StreamExt};
use pairlink_core::{PeerId, RoomId, SignalKind, SignalMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, info, warn};

use crate::error::NetworkError;
use crate::signaling::{SignalEvent, SignalingOutput};

/// How long the service may take to send `welcome` after the socket opens.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

type EventHandler = Arc<dyn Fn(&SignalEvent) + Send + Sync>;
type Handlers = Arc<DashMap<SignalKind, Vec<EventHandler>>>;

struct ClientInner {
    url: String,
    local_id: PeerId,
    outgoing: mpsc::UnboundedSender<Message>,
    handlers: Handlers,
}

/// WebSocket connection to the rendezvous service.
///
/// Cheap to clone. Dropping every clone closes the socket.
#[derive(Clone)]
pub struct SignalingClient {
    inner: Arc<ClientInner>,
}

impl SignalingClient {
    /// Open the socket and wait for the service to assign our peer id.
    ///
    /// Returns the client and the ordered stream of everything the service
    /// sends afterwards, ending with [`SignalEvent::Disconnected`].
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SignalEvent>), NetworkError> {
        let (socket, _) = connect_async(url)
            .await
            .map_err(|source| NetworkError::Connect {
                url: url.to_owned(),
                source,
            })?;
        let (mut sink, mut stream) = socket.split();

        let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, await_welcome(&mut stream)).await;
        let local_id = match handshake {
            Ok(Ok(id)) => id,
            Ok(Err(reason)) => {
                return Err(NetworkError::Handshake {
                    url: url.to_owned(),
                    reason,
                });
            }
            Err(_) => {
                return Err(NetworkError::Handshake {
                    url: url.to_owned(),
                    reason: "timed out waiting for welcome".to_owned(),
                });
            }
        };
        info!("Connected to signaling service at {} as {}", url, local_id);

        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let handlers: Handlers = Arc::new(DashMap::new());

        let mut send_task = tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                if sink.send(msg).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let mut recv_task = tokio::spawn({
            let handlers = handlers.clone();
            let event_tx = event_tx.clone();

            async move {
                while let Some(frame) = stream.next().await {
                    match frame {
                        Ok(Message::Text(text)) => dispatch(text.as_str(), &handlers, &event_tx),
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            warn!("Signaling socket error: {}", e);
                            break;
                        }
                    }
                }
            }
        });

        tokio::spawn(async move {
            let writer_finished = tokio::select! {
                _ = (&mut send_task) => true,
                _ = (&mut recv_task) => false,
            };
            // Wait for the other half to be dropped so that `emit` fails from
            // here on.
            if writer_finished {
                recv_task.abort();
                let _ = recv_task.await;
            } else {
                send_task.abort();
                let _ = send_task.await;
            }
            info!("Signaling connection closed");
            let _ = event_tx.send(SignalEvent::Disconnected);
        });

        let client = Self {
            inner: Arc::new(ClientInner {
                url: url.to_owned(),
                local_id,
                outgoing,
                handlers,
            }),
        };
        Ok((client, event_rx))
    }

    pub fn local_id(&self) -> PeerId {
        self.inner.local_id
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn join_room(&self, room: &RoomId) -> Result<(), NetworkError> {
        info!("Joining room {}", room);
        self.send_signal(SignalMessage::JoinRoom(room.clone()))
    }

    /// Call `handler` for every incoming event of `kind`, before the event is
    /// queued on the stream returned by [`connect`](Self::connect).
    pub fn on_event<F>(&self, kind: SignalKind, handler: F)
    where
        F: Fn(&SignalEvent) + Send + Sync + 'static,
    {
        self.inner
            .handlers
            .entry(kind)
            .or_default()
            .push(Arc::new(handler));
    }

    pub fn send_signal(&self, msg: SignalMessage) -> Result<(), NetworkError> {
        let kind = msg.kind();
        let json = msg
            .to_json()
            .map_err(|source| NetworkError::Encode { kind, source })?;

        debug!("Emitting {}", kind);
        self.inner
            .outgoing
            .send(Message::Text(json.into()))
            .map_err(|_| NetworkError::Closed)
    }

    /// Ask the service to close the socket.
    pub fn disconnect(&self) {
        let _ = self.inner.outgoing.send(Message::Close(None));
    }
}

#[async_trait]
impl SignalingOutput for SignalingClient {
    async fn emit(&self, msg: SignalMessage) -> Result<(), NetworkError> {
        self.send_signal(msg)
    }
}

async fn await_welcome<S>(stream: &mut S) -> Result<PeerId, String>
where
    S: Stream<Item = Result<Message, WsError>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                return match SignalMessage::from_json(text.as_str()) {
                    Ok(SignalMessage::Welcome(id)) => Ok(id),
                    Ok(other) => Err(format!("expected welcome, got {}", other.kind())),
                    Err(e) => Err(format!("invalid welcome frame: {e}")),
                };
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => return Err(e.to_string()),
        }
    }
    Err("connection closed before welcome".to_owned())
}

fn dispatch(text: &str, handlers: &Handlers, event_tx: &mpsc::UnboundedSender<SignalEvent>) {
    let msg = match SignalMessage::from_json(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Invalid signaling frame: {}", e);
            return;
        }
    };

    let event = match SignalEvent::try_from(msg) {
        Ok(event) => event,
        Err(other) => {
            warn!("Unexpected {} from signaling service", other.kind());
            return;
        }
    };

    if let Some(kind) = event.kind() {
        // Clone the list so a handler may register further handlers.
        let subscribed = handlers.get(&kind).map(|list| list.clone());
        for handler in subscribed.into_iter().flatten() {
            handler(&event);
        }
    }

    let _ = event_tx.send(event);
}
