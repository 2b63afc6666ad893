use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::ids::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrivateStoreType {
    None,
    Sell,
    Buy,
    PackageSell,
}

/// A `Character` plus player identity, progression, and the slots the
/// higher-level components (duel, olympiad, offline-trade, cursed-weapon)
/// read and write. `visibility_cache_region` is the only field the
/// visibility manager writes; everything else is owned by gameplay logic
/// outside this crate's scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub character: Character,

    pub name: String,
    pub character_id: u32,
    pub account_id: u32,
    pub class_id: u32,
    pub race_id: u32,
    pub level: u8,
    pub experience: u64,

    pub cursed_weapon_id: Option<u32>,
    pub karma: i64,
    pub pk_kills: u32,

    pub private_store_type: PrivateStoreType,
    pub private_store_message: String,
    pub sell_list: Vec<(u32, u64, u64)>,
    pub buy_list: Vec<(u32, u64, u64)>,

    pub party_id: Option<u32>,
    pub target_id: Option<ObjectId>,
    pub access_level: u8,
    pub invisible: bool,
    pub invulnerable: bool,

    pub last_admin_message: Option<String>,
}

impl Player {
    pub fn object_id(&self) -> ObjectId {
        self.character.object_id
    }

    /// Guard used by the duel engine (spec §4.4 `CanDuel`).
    pub fn can_duel(&self) -> bool {
        self.character.is_alive()
            && self.character.hp * 2 >= self.character.max_hp
            && self.character.mp * 2 >= self.character.max_mp
    }
}
