use pairlink_core::{PeerId, RoomId};

/// Negotiation role of a member, fixed by the first offer or answer it sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Undetermined,
    Offerer,
    Answerer,
}

#[derive(Debug, Clone)]
pub struct Member {
    pub peer_id: PeerId,
    pub role: Role,
}

/// Membership of a single room, in join order.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    members: Vec<Member>,
}

impl Room {
    pub(crate) fn new(id: RoomId) -> Self {
        Self {
            id,
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.members.iter().any(|m| &m.peer_id == peer_id)
    }

    pub fn member(&self, peer_id: &PeerId) -> Option<&Member> {
        self.members.iter().find(|m| &m.peer_id == peer_id)
    }

    pub fn member_ids(&self) -> Vec<PeerId> {
        self.members.iter().map(|m| m.peer_id).collect()
    }

    /// Every member except `peer_id`.
    pub fn others(&self, peer_id: &PeerId) -> Vec<PeerId> {
        self.members
            .iter()
            .filter(|m| &m.peer_id != peer_id)
            .map(|m| m.peer_id)
            .collect()
    }

    pub(crate) fn insert(&mut self, peer_id: PeerId) {
        if !self.contains(&peer_id) {
            self.members.push(Member {
                peer_id,
                role: Role::Undetermined,
            });
        }
    }

    pub(crate) fn remove(&mut self, peer_id: &PeerId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.peer_id != peer_id);
        self.members.len() != before
    }

    /// Records `role` unless the member already has one. Returns the role in effect.
    pub(crate) fn assign_role(&mut self, peer_id: &PeerId, role: Role) -> Option<Role> {
        let member = self.members.iter_mut().find(|m| &m.peer_id == peer_id)?;
        if member.role == Role::Undetermined {
            member.role = role;
        }
        Some(member.role)
    }
}
