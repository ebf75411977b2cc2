use async_trait::async_trait;
use pairlink_core::{PeerId, SignalMessage};

/// Delivery side of the relay: whatever holds the client connections
/// implements this so the relay can push messages to a member.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Queue `msg` for `peer_id`. Must not block on the peer's socket.
    async fn send(&self, peer_id: PeerId, msg: SignalMessage);
}
