use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::ids::ObjectId;

/// A `Character` bound to a content template. Drop mechanics are out of
/// scope (spec §1); `template_id` is only used here to tell monsters apart
/// for the cursed-weapon drop check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    pub character: Character,
    pub template_id: u32,
    pub is_monster: bool,
}

impl Npc {
    pub fn object_id(&self) -> ObjectId {
        self.character.object_id
    }
}
