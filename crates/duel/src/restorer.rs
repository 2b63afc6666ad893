use world_types::{Location, ObjectId, WorldResult};

/// Collaborator the duel engine asks to write restored HP/MP/CP/location
/// back onto a participant. Kept out of this crate's struct so the duel
/// engine has no upward dependency on however the caller represents a live
/// character (open question in spec §9; decision recorded in DESIGN.md).
pub trait ConditionRestorer: Send + Sync {
    fn restore_condition(&self, object_id: ObjectId, hp: i32, mp: i32, cp: i32, location: Location) -> WorldResult<()>;
}
