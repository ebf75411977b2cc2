use crate::session::NegotiationState;
use pairlink_core::ErrorCode;
use thiserror::Error;

/// Faults raised while negotiating a call. None of them should take the
/// process down; the coordinator ends the offending session and carries on.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("cannot {operation} in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: NegotiationState,
    },

    #[error("unexpected {0}: no matching negotiation in progress")]
    UnexpectedMessage(&'static str),

    #[error("both peers sent an offer at the same time")]
    NegotiationConflict,

    #[error("not in a room")]
    NotInRoom,

    #[error("relay rejected request: {code}: {message}")]
    Rejected { code: ErrorCode, message: String },

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl NegotiationError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            NegotiationError::InvalidState { .. } => Some(ErrorCode::InvalidState),
            NegotiationError::UnexpectedMessage(_) => Some(ErrorCode::UnexpectedMessage),
            NegotiationError::NegotiationConflict => Some(ErrorCode::NegotiationConflict),
            NegotiationError::Rejected { code, .. } => Some(*code),
            NegotiationError::NotInRoom | NegotiationError::Transport(_) => None,
        }
    }
}
