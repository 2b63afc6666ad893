use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Stable 32-bit object id. IDs are partitioned into disjoint ranges per
/// kind; the partition is part of the contract (spec §3), not an
/// implementation detail, so `WorldObjectKind::of` never needs a lookup.
pub type ObjectId = u32;

pub const PLAYER_ID_RANGE: std::ops::Range<ObjectId> = 0x0000_0001..0x1000_0000;
pub const NPC_ID_RANGE: std::ops::Range<ObjectId> = 0x1000_0000..0x7000_0000;
pub const ITEM_ID_RANGE: std::ops::Range<ObjectId> = 0x7000_0000..0xFFFF_FFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldObjectKind {
    Player,
    Npc,
    Monster,
    Item,
}

impl WorldObjectKind {
    /// Infer the kind from an id alone. Monster vs. Npc cannot be told apart
    /// by id range (both live in `NPC_ID_RANGE`); callers that need the
    /// distinction hold it themselves (e.g. in `WorldObjectHandle`).
    pub fn of(id: ObjectId) -> Option<WorldObjectKind> {
        if PLAYER_ID_RANGE.contains(&id) {
            Some(WorldObjectKind::Player)
        } else if NPC_ID_RANGE.contains(&id) {
            Some(WorldObjectKind::Npc)
        } else if ITEM_ID_RANGE.contains(&id) {
            Some(WorldObjectKind::Item)
        } else {
            None
        }
    }
}

/// A lightweight, `Copy` handle to whatever occupies a location. This is the
/// "WorldObject reference" the grid, regions, and visibility cache traffic
/// in — never the live, lockable `Player`/`Npc` state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldObjectHandle {
    pub id: ObjectId,
    pub kind: WorldObjectKind,
    pub location: Location,
}

impl WorldObjectHandle {
    pub fn new(id: ObjectId, kind: WorldObjectKind, location: Location) -> Self {
        Self { id, kind, location }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_disjoint() {
        assert!(!PLAYER_ID_RANGE.contains(&NPC_ID_RANGE.start));
        assert!(!NPC_ID_RANGE.contains(&ITEM_ID_RANGE.start));
        assert!(!ITEM_ID_RANGE.contains(&PLAYER_ID_RANGE.start));
    }

    #[test]
    fn kind_of_is_stable() {
        assert_eq!(WorldObjectKind::of(1), Some(WorldObjectKind::Player));
        assert_eq!(WorldObjectKind::of(0x1000_0000), Some(WorldObjectKind::Npc));
        assert_eq!(WorldObjectKind::of(0x7000_0000), Some(WorldObjectKind::Item));
        assert_eq!(WorldObjectKind::of(0), None);
    }
}
