mod description;
mod error;
mod peer;
mod room;
mod signaling;

pub use description::{IceCandidate, SdpType, SessionDescription};
pub use error::ErrorCode;
pub use peer::{ParsePeerIdError, PeerId};
pub use room::RoomId;
pub use signaling::{IceServerConfig, SignalMessage};
