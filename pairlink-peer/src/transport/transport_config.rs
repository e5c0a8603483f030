use pairlink_core::IceServerConfig;
use pairlink_core::utils::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2, DEFAULT_STUN_ADDR_3};

/// Settings handed to the WebRTC engine for every new peer connection.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Gather 127.0.0.1 candidates too. Only useful when both peers share a host.
    pub include_loopback_candidates: bool,
}

impl TransportConfig {
    /// No STUN/TURN at all, host candidates only.
    pub fn local_only() -> Self {
        Self {
            ice_servers: Vec::new(),
            include_loopback_candidates: true,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec![
                    DEFAULT_STUN_ADDR.to_owned(),
                    DEFAULT_STUN_ADDR_2.to_owned(),
                    DEFAULT_STUN_ADDR_3.to_owned(),
                ],
                username: None,
                credential: None,
            }],
            include_loopback_candidates: false,
        }
    }
}
