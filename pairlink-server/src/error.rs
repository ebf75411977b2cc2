use pairlink_core::{ErrorCode, RoomId};
use thiserror::Error;

/// Membership violations. Reported back to the offending sender only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("room '{room_id}' is full ({capacity} members)")]
    RoomFull { room_id: RoomId, capacity: usize },

    #[error("not a member of room '{room_id}'")]
    NotAMember { room_id: RoomId },
}

impl RelayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RelayError::RoomFull { .. } => ErrorCode::RoomFull,
            RelayError::NotAMember { .. } => ErrorCode::NotAMember,
        }
    }

    pub fn room_id(&self) -> &RoomId {
        match self {
            RelayError::RoomFull { room_id, .. } | RelayError::NotAMember { room_id } => room_id,
        }
    }
}
