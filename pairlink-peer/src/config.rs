use pairlink_core::IceServerConfig;
use std::env;
use std::time::Duration;
use tracing::warn;

use crate::room::{CoordinatorConfig, DEFAULT_NEGOTIATION_TIMEOUT};
use crate::transport::TransportConfig;
use pairlink_core::utils::CHAT_CHANNEL_LABEL;

pub const DEFAULT_SIGNALING_URL: &str = "ws://127.0.0.1:5000/ws";

#[derive(Debug, Clone)]
pub struct PeerConfig {
    pub signaling_url: String,
    pub transport: TransportConfig,
    pub negotiation_timeout: Duration,
    pub channel_label: String,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            signaling_url: DEFAULT_SIGNALING_URL.to_owned(),
            transport: TransportConfig::default(),
            negotiation_timeout: DEFAULT_NEGOTIATION_TIMEOUT,
            channel_label: CHAT_CHANNEL_LABEL.to_owned(),
        }
    }
}

impl PeerConfig {
    /// Defaults overridden by `PAIRLINK_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("PAIRLINK_SIGNALING_URL") {
            config.signaling_url = url;
        }

        if let Some(turn_url) = lookup("PAIRLINK_TURN_URL") {
            config.transport.ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: lookup("PAIRLINK_TURN_USERNAME"),
                credential: lookup("PAIRLINK_TURN_CREDENTIAL"),
            });
        }

        if let Some(secs) = lookup("PAIRLINK_NEGOTIATION_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => config.negotiation_timeout = Duration::from_secs(secs),
                _ => warn!(
                    "Ignoring invalid PAIRLINK_NEGOTIATION_TIMEOUT_SECS={:?}",
                    secs
                ),
            }
        }

        config
    }

    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            negotiation_timeout: self.negotiation_timeout,
            channel_label: self.channel_label.clone(),
        }
    }
}
