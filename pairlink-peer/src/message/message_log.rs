use crate::message::Message;
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only record of the conversation, in local arrival order.
///
/// Clones share the same underlying log, so the presentation layer can read
/// while the coordinator appends.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Arc<RwLock<Vec<Message>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, message: Message) {
        self.entries.write().push(message);
    }

    /// Snapshot of every message so far, oldest first.
    pub fn all(&self) -> Vec<Message> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
