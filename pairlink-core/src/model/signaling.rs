use crate::model::description::{IceCandidate, SessionDescription};
use crate::model::error::ErrorCode;
use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// Control messages exchanged between clients and the relay.
///
/// The sender of a message is never part of the payload; the relay binds it
/// to the websocket the frame arrived on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d", rename_all_fields = "camelCase")]
pub enum SignalMessage {
    // client -> relay
    Join {
        room_id: RoomId,
    },
    Leave {
        room_id: RoomId,
    },

    // client -> relay -> other member
    Offer {
        room_id: RoomId,
        sdp: SessionDescription,
    },
    Answer {
        room_id: RoomId,
        sdp: SessionDescription,
    },
    Candidate {
        room_id: RoomId,
        candidate: IceCandidate,
    },
    EndCall {
        room_id: RoomId,
    },

    // relay -> client
    Welcome {
        peer_id: PeerId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Joined {
        room_id: RoomId,
    },
    Error {
        code: ErrorCode,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
        message: String,
    },
}

impl SignalMessage {
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            SignalMessage::Join { room_id }
            | SignalMessage::Leave { room_id }
            | SignalMessage::Offer { room_id, .. }
            | SignalMessage::Answer { room_id, .. }
            | SignalMessage::Candidate { room_id, .. }
            | SignalMessage::EndCall { room_id }
            | SignalMessage::Joined { room_id } => Some(room_id),
            SignalMessage::Error { room_id, .. } => room_id.as_ref(),
            SignalMessage::Welcome { .. } | SignalMessage::IceConfig { .. } => None,
        }
    }

    /// Short name used in log lines.
    pub fn op(&self) -> &'static str {
        match self {
            SignalMessage::Join { .. } => "Join",
            SignalMessage::Leave { .. } => "Leave",
            SignalMessage::Offer { .. } => "Offer",
            SignalMessage::Answer { .. } => "Answer",
            SignalMessage::Candidate { .. } => "Candidate",
            SignalMessage::EndCall { .. } => "EndCall",
            SignalMessage::Welcome { .. } => "Welcome",
            SignalMessage::IceConfig { .. } => "IceConfig",
            SignalMessage::Joined { .. } => "Joined",
            SignalMessage::Error { .. } => "Error",
        }
    }

    pub fn error(code: ErrorCode, room_id: Option<RoomId>, message: impl Into<String>) -> Self {
        SignalMessage::Error {
            code,
            room_id,
            message: message.into(),
        }
    }
}
