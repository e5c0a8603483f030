use bytes::Bytes;
use pairlink_core::PeerId;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ChannelNotOpenError, SendError};
use crate::message::{Message, MessageLog};
use crate::transport::ChannelTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => f.write_str("connecting"),
            Self::Open => f.write_str("open"),
            Self::Closed => f.write_str("closed"),
        }
    }
}

/// The single reliable, ordered text channel between the two peers.
pub struct DataChannelSession {
    channel: Arc<dyn ChannelTransport>,
    peer: PeerId,
    state: ChannelState,
    log: MessageLog,
}

impl DataChannelSession {
    pub fn new(channel: Arc<dyn ChannelTransport>, peer: PeerId, log: MessageLog) -> Self {
        Self {
            channel,
            peer,
            state: ChannelState::Connecting,
            log,
        }
    }

    pub fn label(&self) -> String {
        self.channel.label()
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    pub fn mark_open(&mut self) {
        if self.state == ChannelState::Connecting {
            self.state = ChannelState::Open;
        }
    }

    pub fn mark_closed(&mut self) {
        self.state = ChannelState::Closed;
    }

    /// Send one text message. Nothing is queued: a channel that is not open
    /// refuses the message outright.
    pub async fn send(&self, value: impl Into<String>) -> Result<Message, SendError> {
        if self.state != ChannelState::Open {
            return Err(ChannelNotOpenError { state: self.state }.into());
        }

        let value = value.into();
        self.channel.send_text(value.clone()).await?;

        let message = Message::local(value);
        self.log.append(message.clone());
        Ok(message)
    }

    /// Record an inbound frame. Binary frames are read as UTF-8.
    pub fn receive(&self, data: Bytes) -> Message {
        let value = String::from_utf8_lossy(&data).into_owned();
        debug!("Received {} bytes from {}", data.len(), self.peer);

        let message = Message::from_peer(self.peer, value);
        self.log.append(message.clone());
        message
    }

    pub async fn close(&mut self) {
        if self.state == ChannelState::Closed {
            return;
        }
        self.state = ChannelState::Closed;

        if let Err(e) = self.channel.close().await {
            warn!("Failed to close data channel with {}: {}", self.peer, e);
        }
    }
}
