use crate::media::MediaConstraints;
use pairlink_core::IceServerConfig;
use pairlink_core::utils::DEFAULT_STUN_ADDR;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Websocket endpoint of the relay, e.g. `ws://127.0.0.1:3000/ws`.
    pub relay_url: String,
    /// Used until the relay pushes its own `IceConfig`.
    pub ice_servers: Vec<IceServerConfig>,
    pub constraints: MediaConstraints,
}

impl ClientConfig {
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            ..Default::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            relay_url: "ws://127.0.0.1:3000/ws".to_owned(),
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN_ADDR)],
            constraints: MediaConstraints::default(),
        }
    }
}
