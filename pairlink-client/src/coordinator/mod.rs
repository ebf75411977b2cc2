mod call_command;
mod negotiation_coordinator;

pub use call_command::*;
pub use negotiation_coordinator::*;
