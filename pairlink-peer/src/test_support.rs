use async_trait::async_trait;
use pairlink_core::{IceCandidate, SessionDescription, SignalMessage};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{NetworkError, TransportError};
use crate::signaling::SignalingOutput;
use crate::transport::{ChannelTransport, PeerTransport};

/// In-memory engine. Candidates whose text contains `bad` are refused.
#[derive(Default)]
pub(crate) struct FakeTransport {
    pub calls: Mutex<Vec<&'static str>>,
    pub applied: Mutex<Vec<IceCandidate>>,
    pub reject_remote: AtomicBool,
    pub channels: Mutex<Vec<Arc<FakeChannel>>>,
}

impl FakeTransport {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    pub fn applied(&self) -> Vec<String> {
        self.applied
            .lock()
            .iter()
            .map(|c| c.candidate.clone())
            .collect()
    }
}

#[async_trait]
impl PeerTransport for FakeTransport {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        self.calls.lock().push("create_offer");
        Ok(SessionDescription::offer("v=0 offer"))
    }

    async fn create_answer(&self) -> Result<SessionDescription, TransportError> {
        self.calls.lock().push("create_answer");
        Ok(SessionDescription::answer("v=0 answer"))
    }

    async fn set_local_description(
        &self,
        _desc: SessionDescription,
    ) -> Result<(), TransportError> {
        self.calls.lock().push("set_local");
        Ok(())
    }

    async fn set_remote_description(
        &self,
        _desc: SessionDescription,
    ) -> Result<(), TransportError> {
        self.calls.lock().push("set_remote");
        if self.reject_remote.load(Ordering::SeqCst) {
            return Err(TransportError::new(
                "set remote description",
                anyhow::anyhow!("malformed SDP"),
            ));
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError> {
        self.calls.lock().push("add_candidate");
        if candidate.candidate.contains("bad") {
            return Err(TransportError::new(
                "add ICE candidate",
                anyhow::anyhow!("unparseable candidate"),
            ));
        }
        self.applied.lock().push(candidate);
        Ok(())
    }

    async fn create_data_channel(
        &self,
        label: &str,
    ) -> Result<Arc<dyn ChannelTransport>, TransportError> {
        self.calls.lock().push("create_data_channel");
        let channel = Arc::new(FakeChannel::new(label));
        self.channels.lock().push(channel.clone());
        Ok(channel)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.calls.lock().push("close");
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeChannel {
    pub label: String,
    pub sent: Mutex<Vec<String>>,
    pub closed: AtomicBool,
    pub fail_send: AtomicBool,
}

impl FakeChannel {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ChannelTransport for FakeChannel {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn send_text(&self, text: String) -> Result<(), TransportError> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(TransportError::new(
                "send on data channel",
                anyhow::anyhow!("sctp association closed"),
            ));
        }
        self.sent.lock().push(text);
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeSignaling {
    pub sent: Mutex<Vec<SignalMessage>>,
    pub offline: AtomicBool,
}

impl FakeSignaling {
    pub fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl SignalingOutput for FakeSignaling {
    async fn emit(&self, msg: SignalMessage) -> Result<(), NetworkError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::Closed);
        }
        self.sent.lock().push(msg);
        Ok(())
    }
}

pub(crate) fn candidate(text: &str) -> IceCandidate {
    IceCandidate {
        candidate: text.to_owned(),
        sdp_mid: Some("0".to_owned()),
        sdp_m_line_index: Some(0),
    }
}
