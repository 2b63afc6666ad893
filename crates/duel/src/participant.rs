use world_types::ObjectId;

/// Per-participant lifecycle state (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantState {
    NoDuel,
    Duelling,
    Dead,
    Winner,
    Interrupted,
}

/// One side of a duel: a leader plus, for party duels, the rest of the
/// party. A 1v1 duel's team has no members.
#[derive(Debug, Clone)]
pub struct Team {
    pub leader: ObjectId,
    pub members: Vec<ObjectId>,
}

impl Team {
    pub fn solo(leader: ObjectId) -> Self {
        Self { leader, members: Vec::new() }
    }

    pub fn party(leader: ObjectId, members: Vec<ObjectId>) -> Self {
        Self { leader, members }
    }

    /// Leader followed by members, checked by object id identity.
    pub fn all_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        std::iter::once(self.leader).chain(self.members.iter().copied())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.leader == id || self.members.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_ids_includes_leader_first() {
        let team = Team::party(1, vec![2, 3]);
        assert_eq!(team.all_ids().collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
