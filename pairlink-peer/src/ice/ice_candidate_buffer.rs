use pairlink_core::IceCandidate;
use tracing::{debug, warn};

use crate::error::IceApplyError;
use crate::transport::PeerTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BufferState {
    /// No remote description yet, candidates are queued.
    Collecting,
    /// Remote description is set, candidates go straight to the engine.
    Flushed,
    /// The owning context is gone.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Applied,
    Queued,
    Dropped,
}

/// Holds remote candidates until the connection can accept them.
///
/// Single use: once flushed it never queues again.
#[derive(Debug)]
pub struct IceCandidateBuffer {
    queue: Vec<IceCandidate>,
    state: BufferState,
}

impl Default for IceCandidateBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl IceCandidateBuffer {
    pub fn new() -> Self {
        Self {
            queue: Vec::new(),
            state: BufferState::Collecting,
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_flushed(&self) -> bool {
        self.state == BufferState::Flushed
    }

    pub async fn add(
        &mut self,
        candidate: IceCandidate,
        transport: &dyn PeerTransport,
    ) -> Result<AddOutcome, IceApplyError> {
        match self.state {
            BufferState::Collecting => {
                debug!("Queueing ICE candidate until remote description is set");
                self.queue.push(candidate);
                Ok(AddOutcome::Queued)
            }
            BufferState::Flushed => {
                apply(candidate, transport).await?;
                Ok(AddOutcome::Applied)
            }
            BufferState::Discarded => Ok(AddOutcome::Dropped),
        }
    }

    /// Apply every queued candidate in arrival order. Failures are logged and
    /// returned; the failing candidate is dropped and the rest still applied.
    pub async fn flush(&mut self, transport: &dyn PeerTransport) -> Vec<IceApplyError> {
        if self.state != BufferState::Collecting {
            return Vec::new();
        }
        self.state = BufferState::Flushed;

        let queued = std::mem::take(&mut self.queue);
        debug!("Flushing {} buffered ICE candidates", queued.len());

        let mut failures = Vec::new();
        for candidate in queued {
            if let Err(e) = apply(candidate, transport).await {
                failures.push(e);
            }
        }
        failures
    }

    pub fn discard(&mut self) {
        self.queue.clear();
        self.state = BufferState::Discarded;
    }
}

async fn apply(candidate: IceCandidate, transport: &dyn PeerTransport) -> Result<(), IceApplyError> {
    let text = candidate.candidate.clone();
    transport.add_ice_candidate(candidate).await.map_err(|source| {
        let err = IceApplyError {
            candidate: text,
            source,
        };
        warn!("{}", err);
        err
    })
}
