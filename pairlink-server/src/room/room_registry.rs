use crate::error::RelayError;
use crate::room::{Role, Room};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use pairlink_core::{PeerId, RoomId};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub room_id: RoomId,
    /// Member count right after the join, including the joiner.
    pub members: usize,
    /// Set when the join moved the peer out of a different room.
    pub previous: Option<Departure>,
}

/// A member leaving a room, with whoever was still in it at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub room_id: RoomId,
    pub remaining: Vec<PeerId>,
}

struct RegistryInner {
    rooms: DashMap<RoomId, Room>,
    memberships: DashMap<PeerId, RoomId>,
    capacity: usize,
}

/// Authoritative room → members table.
///
/// Each room lives in its own map entry, so every mutation of a room runs
/// under that entry's shard lock and unrelated rooms do not contend. Guards
/// are never held across an await or while touching a second entry.
#[derive(Clone)]
pub struct RoomRegistry {
    inner: Arc<RegistryInner>,
}

impl RoomRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                rooms: DashMap::new(),
                memberships: DashMap::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Adds `peer_id` to `room_id`, creating the room on first join.
    ///
    /// Joining the room the peer is already in is a no-op. Joining another
    /// room moves the peer; the old membership is only dropped once the new
    /// one is secured, so a `RoomFull` rejection leaves everything unchanged.
    pub fn join(&self, peer_id: PeerId, room_id: &RoomId) -> Result<Membership, RelayError> {
        let members = {
            let mut room = self
                .inner
                .rooms
                .entry(room_id.clone())
                .or_insert_with(|| {
                    info!("Creating room '{}'", room_id);
                    Room::new(room_id.clone())
                });

            if room.contains(&peer_id) {
                debug!("Peer {} already in room '{}'", peer_id, room_id);
                return Ok(Membership {
                    room_id: room_id.clone(),
                    members: room.len(),
                    previous: None,
                });
            }

            if room.len() >= self.capacity() {
                return Err(RelayError::RoomFull {
                    room_id: room_id.clone(),
                    capacity: self.capacity(),
                });
            }

            room.insert(peer_id);
            room.len()
        };

        let previous = self
            .inner
            .memberships
            .insert(peer_id, room_id.clone())
            .filter(|old| old != room_id)
            .map(|old| self.remove_from_room(old, &peer_id));

        info!("Peer {} joined room '{}' ({} members)", peer_id, room_id, members);

        Ok(Membership {
            room_id: room_id.clone(),
            members,
            previous,
        })
    }

    /// Removes `peer_id` from whatever room it occupies. Returns `None` when
    /// it was in no room, so concurrent cleanups see exactly one departure.
    pub fn leave(&self, peer_id: &PeerId) -> Option<Departure> {
        let (_, room_id) = self.inner.memberships.remove(peer_id)?;
        let departure = self.remove_from_room(room_id, peer_id);
        info!("Peer {} left room '{}'", peer_id, departure.room_id);
        Some(departure)
    }

    /// The other members of `room_id`; empty if there are none or the room does not exist.
    pub fn members_excluding(&self, room_id: &RoomId, peer_id: &PeerId) -> Vec<PeerId> {
        self.inner
            .rooms
            .get(room_id)
            .map(|room| room.others(peer_id))
            .unwrap_or_default()
    }

    /// Membership check and fan-out target selection under one room lock.
    pub fn resolve_targets(
        &self,
        room_id: &RoomId,
        sender: &PeerId,
    ) -> Result<Vec<PeerId>, RelayError> {
        match self.inner.rooms.get(room_id) {
            Some(room) if room.contains(sender) => Ok(room.others(sender)),
            _ => Err(RelayError::NotAMember {
                room_id: room_id.clone(),
            }),
        }
    }

    pub fn room_of(&self, peer_id: &PeerId) -> Option<RoomId> {
        self.inner
            .memberships
            .get(peer_id)
            .map(|entry| entry.value().clone())
    }

    pub fn members(&self, room_id: &RoomId) -> Vec<PeerId> {
        self.inner
            .rooms
            .get(room_id)
            .map(|room| room.member_ids())
            .unwrap_or_default()
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.inner.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.inner.rooms.len()
    }

    pub fn assign_role(&self, room_id: &RoomId, peer_id: &PeerId, role: Role) -> Option<Role> {
        self.inner
            .rooms
            .get_mut(room_id)
            .and_then(|mut room| room.assign_role(peer_id, role))
    }

    pub fn role_of(&self, room_id: &RoomId, peer_id: &PeerId) -> Option<Role> {
        self.inner
            .rooms
            .get(room_id)
            .and_then(|room| room.member(peer_id).map(|m| m.role))
    }

    fn remove_from_room(&self, room_id: RoomId, peer_id: &PeerId) -> Departure {
        match self.inner.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().remove(peer_id);
                let remaining = entry.get().member_ids();
                if entry.get().is_empty() {
                    info!("Room '{}' is empty, removing", entry.get().id());
                    entry.remove();
                }
                Departure { room_id, remaining }
            }
            Entry::Vacant(_) => Departure {
                room_id,
                remaining: Vec::new(),
            },
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(pairlink_core::utils::DEFAULT_ROOM_CAPACITY)
    }
}
