mod transport_event;
mod webrtc_transport;

pub use transport_event::*;
pub use webrtc_transport::*;

use crate::media::LocalTracks;
use anyhow::Result;
use async_trait::async_trait;
use pairlink_core::{IceCandidate, IceServerConfig, SessionDescription};

/// The peer-to-peer connection primitive a `PeerSession` drives.
///
/// Implementations enforce the usual ordering rules themselves (a candidate
/// before any remote description is rejected), which is why the session
/// buffers in front of them.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn add_candidate(&self, candidate: IceCandidate) -> Result<()>;

    /// Attach local media so it is negotiated in the next offer/answer.
    async fn add_local_tracks(&self, tracks: &LocalTracks) -> Result<()>;

    /// Tear down the connection. Called once, from `PeerSession::end`.
    async fn close(&self) -> Result<()>;
}

/// Builds one transport per negotiation attempt.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// `events` must receive every candidate/track/state event the new
    /// transport produces.
    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        events: TransportEventSink,
    ) -> Result<Box<dyn PeerTransport>>;
}
