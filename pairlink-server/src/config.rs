use pairlink_core::IceServerConfig;
use pairlink_core::utils::{DEFAULT_ROOM_CAPACITY, DEFAULT_STUN_ADDR};
use std::net::SocketAddr;

/// Relay settings.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    /// Maximum concurrent members per room.
    pub room_capacity: usize,
    /// Pushed to every client on connect.
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            room_capacity: DEFAULT_ROOM_CAPACITY,
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)],
        }
    }
}
