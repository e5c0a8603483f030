use chrono::{DateTime, Utc};
use pairlink_core::PeerId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Local,
    Peer(PeerId),
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("me"),
            Self::Peer(_) => f.write_str("peer"),
        }
    }
}

/// One chat line, stamped when this side observed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: Sender,
    pub value: String,
    pub received_at: DateTime<Utc>,
}

impl Message {
    pub fn local(value: impl Into<String>) -> Self {
        Self {
            from: Sender::Local,
            value: value.into(),
            received_at: Utc::now(),
        }
    }

    pub fn from_peer(peer: PeerId, value: impl Into<String>) -> Self {
        Self {
            from: Sender::Peer(peer),
            value: value.into(),
            received_at: Utc::now(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.from == Sender::Local
    }
}
