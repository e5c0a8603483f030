use std::env;
use std::net::SocketAddr;
use tracing::warn;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
        }
    }
}

impl ServerConfig {
    /// Defaults, with the listen address taken from `PAIRLINK_BIND` if set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(bind) = env::var("PAIRLINK_BIND") {
            match bind.parse() {
                Ok(addr) => config.bind = addr,
                Err(e) => warn!("Ignoring invalid PAIRLINK_BIND={:?}: {}", bind, e),
            }
        }
        config
    }
}
