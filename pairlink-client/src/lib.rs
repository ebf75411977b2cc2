pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod media;
pub mod relay;
pub mod session;
pub mod transport;

pub use client::CallClient;
pub use config::ClientConfig;
pub use coordinator::*;
pub use error::NegotiationError;
pub use media::*;
pub use relay::RelayConnection;
pub use session::*;
pub use transport::*;
