use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure categories shared by the relay and the clients. Carried on the
/// wire in `SignalMessage::Error`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    RoomFull,
    NotAMember,
    InvalidState,
    UnexpectedMessage,
    NegotiationConflict,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::RoomFull => "room full",
            ErrorCode::NotAMember => "not a member",
            ErrorCode::InvalidState => "invalid state",
            ErrorCode::UnexpectedMessage => "unexpected message",
            ErrorCode::NegotiationConflict => "negotiation conflict",
        };
        f.write_str(name)
    }
}
