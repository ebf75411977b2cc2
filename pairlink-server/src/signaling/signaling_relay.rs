use crate::error::RelayError;
use crate::room::{Departure, Role, RoomRegistry};
use crate::signaling::SignalingOutput;
use pairlink_core::{PeerId, RoomId, SignalMessage};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes negotiation messages between members of the same room.
///
/// Targets are resolved against the registry first; delivery happens after
/// the room lock is released. Messages from one sender are handled in the
/// order the caller passes them in.
#[derive(Clone)]
pub struct SignalingRelay {
    registry: RoomRegistry,
    output: Arc<dyn SignalingOutput>,
}

impl SignalingRelay {
    pub fn new(registry: RoomRegistry, output: Arc<dyn SignalingOutput>) -> Self {
        Self { registry, output }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Handles one message from `sender`. Membership errors are reported
    /// back to the sender before being returned.
    pub async fn handle(&self, sender: PeerId, msg: SignalMessage) -> Result<(), RelayError> {
        debug!("{} from {}", msg.op(), sender);

        let result = match msg {
            SignalMessage::Join { room_id } => self.join(sender, room_id).await,
            SignalMessage::Leave { room_id } => self.leave(sender, &room_id),
            SignalMessage::EndCall { room_id } => self.end_call(sender, room_id).await,
            SignalMessage::Offer { .. }
            | SignalMessage::Answer { .. }
            | SignalMessage::Candidate { .. } => self.forward(sender, msg).await,
            other => {
                warn!("Peer {} sent relay-only message {}, dropping", sender, other.op());
                Ok(())
            }
        };

        if let Err(e) = &result {
            warn!("Rejected message from {}: {}", sender, e);
            self.report(sender, e).await;
        }
        result
    }

    /// Connection loss: the remaining member gets a synthesized `EndCall`.
    /// Safe to call after an explicit `EndCall`/`Leave`; it then does nothing.
    pub async fn handle_disconnect(&self, peer_id: PeerId) {
        match self.registry.leave(&peer_id) {
            Some(departure) => {
                info!(
                    "Peer {} disconnected from room '{}'",
                    peer_id, departure.room_id
                );
                self.notify_end(departure).await;
            }
            None => debug!("Peer {} disconnected outside any room", peer_id),
        }
    }

    async fn join(&self, sender: PeerId, room_id: RoomId) -> Result<(), RelayError> {
        let membership = self.registry.join(sender, &room_id)?;

        if let Some(previous) = membership.previous {
            self.notify_end(previous).await;
        }

        self.output
            .send(sender, SignalMessage::Joined { room_id })
            .await;
        Ok(())
    }

    fn leave(&self, sender: PeerId, room_id: &RoomId) -> Result<(), RelayError> {
        self.ensure_member(&sender, room_id)?;
        self.registry.leave(&sender);
        Ok(())
    }

    async fn end_call(&self, sender: PeerId, room_id: RoomId) -> Result<(), RelayError> {
        self.ensure_member(&sender, &room_id)?;

        if let Some(departure) = self.registry.leave(&sender) {
            self.notify_end(departure).await;
        }
        Ok(())
    }

    async fn forward(&self, sender: PeerId, msg: SignalMessage) -> Result<(), RelayError> {
        let Some(room_id) = msg.room_id() else {
            return Ok(());
        };

        let targets = self.registry.resolve_targets(room_id, &sender)?;

        match &msg {
            SignalMessage::Offer { .. } => {
                self.registry.assign_role(room_id, &sender, Role::Offerer);
            }
            SignalMessage::Answer { .. } => {
                self.registry.assign_role(room_id, &sender, Role::Answerer);
            }
            _ => {}
        }

        if targets.is_empty() {
            debug!("{} from {} has no recipients in '{}'", msg.op(), sender, room_id);
        }

        for target in targets {
            self.output.send(target, msg.clone()).await;
        }
        Ok(())
    }

    async fn notify_end(&self, departure: Departure) {
        for peer_id in departure.remaining {
            self.output
                .send(
                    peer_id,
                    SignalMessage::EndCall {
                        room_id: departure.room_id.clone(),
                    },
                )
                .await;
        }
    }

    fn ensure_member(&self, peer_id: &PeerId, room_id: &RoomId) -> Result<(), RelayError> {
        match self.registry.room_of(peer_id) {
            Some(current) if &current == room_id => Ok(()),
            _ => Err(RelayError::NotAMember {
                room_id: room_id.clone(),
            }),
        }
    }

    async fn report(&self, peer_id: PeerId, error: &RelayError) {
        let msg = SignalMessage::error(
            error.code(),
            Some(error.room_id().clone()),
            error.to_string(),
        );
        self.output.send(peer_id, msg).await;
    }
}
