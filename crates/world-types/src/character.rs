use serde::{Deserialize, Serialize};

use crate::ids::{ObjectId, WorldObjectKind};
use crate::location::Location;

/// A character may have at most this many saved HP/MP/CP/location snapshots
/// outstanding at once (duel pre-fight save, olympiad pre-match save, etc.
/// can nest up to this depth). Open question in spec §3 ("maximum-of-N
/// saved conditions"); fixed here at 4, recorded in DESIGN.md.
pub const MAX_SAVED_CONDITIONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedCondition {
    pub hp: i32,
    pub mp: i32,
    pub cp: i32,
    pub location: Location,
}

/// Bitset of zone-membership flags a character currently carries. Each zone
/// type sets/clears the bits it owns on enter/exit (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneFlags(pub u64);

impl ZoneFlags {
    pub const PVP: u64 = 1 << 0;
    pub const PEACE: u64 = 1 << 1;
    pub const WATER: u64 = 1 << 2;
    pub const TOWN: u64 = 1 << 3;
    pub const CASTLE: u64 = 1 << 4;
    pub const SWAMP: u64 = 1 << 5;
    pub const JAIL: u64 = 1 << 6;
    pub const SIEGE: u64 = 1 << 7;
    pub const NO_LANDING: u64 = 1 << 8;
    pub const NO_RESTART: u64 = 1 << 9;
    pub const NO_STORE: u64 = 1 << 10;
    pub const NO_SUMMON_FRIEND: u64 = 1 << 11;
    pub const NO_PVP: u64 = 1 << 12;
    pub const BOSS: u64 = 1 << 13;
    pub const MOTHER_TREE: u64 = 1 << 14;
    pub const OLYMPIAD: u64 = 1 << 15;

    pub fn set(&mut self, bits: u64) {
        self.0 |= bits;
    }

    pub fn clear(&mut self, bits: u64) {
        self.0 &= !bits;
    }

    pub fn has(&self, bits: u64) -> bool {
        self.0 & bits == bits
    }
}

/// The capability set every mobile entity exposes, replacing the source's
/// `Player -> Character -> WorldObject` embedding chain with plain
/// composition (spec §9): `Player` and `Npc` each hold a `Character` value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub object_id: ObjectId,
    pub kind: WorldObjectKind,
    pub location: Location,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub cp: i32,
    pub max_cp: i32,
    pub zone_flags: ZoneFlags,
    saved_conditions: Vec<SavedCondition>,
}

impl Character {
    pub fn new(object_id: ObjectId, kind: WorldObjectKind, location: Location, max_hp: i32, max_mp: i32, max_cp: i32) -> Self {
        Self {
            object_id,
            kind,
            location,
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            cp: max_cp,
            max_cp,
            zone_flags: ZoneFlags::default(),
            saved_conditions: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Pushes a saved condition snapshot. Fails (silently truncates the
    /// oldest entry) only if called beyond `MAX_SAVED_CONDITIONS`, which a
    /// correct caller never does; this does not return a `Result` because
    /// every caller in this crate tracks its own nesting depth.
    pub fn push_saved_condition(&mut self, cond: SavedCondition) {
        if self.saved_conditions.len() >= MAX_SAVED_CONDITIONS {
            self.saved_conditions.remove(0);
        }
        self.saved_conditions.push(cond);
    }

    pub fn pop_saved_condition(&mut self) -> Option<SavedCondition> {
        self.saved_conditions.pop()
    }

    pub fn saved_conditions(&self) -> &[SavedCondition] {
        &self.saved_conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_conditions_cap_at_max() {
        let mut c = Character::new(1, WorldObjectKind::Player, Location::default(), 100, 100, 100);
        for i in 0..(MAX_SAVED_CONDITIONS + 2) {
            c.push_saved_condition(SavedCondition {
                hp: i as i32,
                mp: 0,
                cp: 0,
                location: Location::default(),
            });
        }
        assert_eq!(c.saved_conditions().len(), MAX_SAVED_CONDITIONS);
        // oldest entries were evicted, newest survive
        assert_eq!(c.saved_conditions().last().unwrap().hp, (MAX_SAVED_CONDITIONS + 1) as i32);
    }

    #[test]
    fn zone_flags_set_clear() {
        let mut f = ZoneFlags::default();
        f.set(ZoneFlags::PVP | ZoneFlags::SIEGE);
        assert!(f.has(ZoneFlags::PVP));
        assert!(f.has(ZoneFlags::SIEGE));
        f.clear(ZoneFlags::PVP);
        assert!(!f.has(ZoneFlags::PVP));
        assert!(f.has(ZoneFlags::SIEGE));
    }
}
