use crate::media::TrackKind;
use pairlink_core::IceCandidate;
use std::fmt;
use tokio::sync::mpsc;

/// Identifies one negotiation attempt; events from replaced sessions are
/// recognised by a stale id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub id: String,
    pub stream_id: String,
    pub kind: TrackKind,
}

#[derive(Debug, Clone)]
pub enum TransportEvent {
    CandidateDiscovered(SessionId, IceCandidate),
    RemoteTrack(SessionId, RemoteTrack),
    Connected(SessionId),
    Failed(SessionId),
}

impl TransportEvent {
    pub fn session_id(&self) -> SessionId {
        match self {
            TransportEvent::CandidateDiscovered(id, _)
            | TransportEvent::RemoteTrack(id, _)
            | TransportEvent::Connected(id)
            | TransportEvent::Failed(id) => *id,
        }
    }
}

/// Handle given to a transport so its callbacks can reach the coordinator loop.
#[derive(Debug, Clone)]
pub struct TransportEventSink {
    session_id: SessionId,
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl TransportEventSink {
    pub fn new(session_id: SessionId, tx: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self { session_id, tx }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn candidate(&self, candidate: IceCandidate) {
        let _ = self
            .tx
            .send(TransportEvent::CandidateDiscovered(self.session_id, candidate));
    }

    pub fn remote_track(&self, track: RemoteTrack) {
        let _ = self
            .tx
            .send(TransportEvent::RemoteTrack(self.session_id, track));
    }

    pub fn connected(&self) {
        let _ = self.tx.send(TransportEvent::Connected(self.session_id));
    }

    pub fn failed(&self) {
        let _ = self.tx.send(TransportEvent::Failed(self.session_id));
    }
}
