/// Public STUN server used when the relay is not configured with its own list.
pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";

/// Room capacity for pairwise calls.
pub const DEFAULT_ROOM_CAPACITY: usize = 2;
