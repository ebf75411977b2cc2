use crate::transport::RemoteTrack;
use pairlink_core::{ErrorCode, RoomId};

/// User intent fed into the coordinator loop.
#[derive(Debug, Clone)]
pub enum CallCommand {
    Join(RoomId),
    StartCall,
    EndCall,
}

/// What the coordinator tells its owner (the UI layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    Joined(RoomId),
    /// Render this track.
    RemoteTrack(RemoteTrack),
    CallEnded {
        by_remote: bool,
    },
    Fault {
        code: Option<ErrorCode>,
        message: String,
    },
}
