use async_trait::async_trait;
use pairlink_core::SignalMessage;
use pairlink_peer::{NetworkError, SignalingOutput};
use parking_lot::Mutex;

/// Captures everything the coordinator emits.
#[derive(Default)]
pub struct MockSignalingOutput {
    sent: Mutex<Vec<SignalMessage>>,
}

impl MockSignalingOutput {
    pub fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().clone()
    }

    /// Drain the captured messages.
    pub fn take(&self) -> Vec<SignalMessage> {
        std::mem::take(&mut *self.sent.lock())
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn emit(&self, msg: SignalMessage) -> Result<(), NetworkError> {
        self.sent.lock().push(msg);
        Ok(())
    }
}
