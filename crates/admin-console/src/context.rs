use world_types::{Location, ObjectId, WorldResult};

/// Collaborator trait the command handlers dispatch through, so this
/// crate has no upward dependency on how the caller represents live
/// player/session state (same pattern as `duel::ConditionRestorer` and
/// `cursed_weapon::KarmaSink`).
pub trait AdminContext: Send + Sync {
    fn resolve_target(&self, name_or_id: &str) -> Option<ObjectId>;

    fn kick(&self, target: ObjectId) -> WorldResult<()>;
    fn ban(&self, target: ObjectId, duration_minutes: Option<u32>) -> WorldResult<()>;
    fn kill(&self, target: ObjectId) -> WorldResult<()>;
    fn res(&self, target: ObjectId) -> WorldResult<()>;
    fn heal(&self, target: ObjectId) -> WorldResult<()>;
    fn info(&self, target: ObjectId) -> WorldResult<String>;
    fn jail(&self, target: ObjectId, duration_minutes: Option<u32>) -> WorldResult<()>;
    fn announce(&self, message: &str) -> WorldResult<()>;
    fn spawn(&self, npc_id: u32, location: Location) -> WorldResult<ObjectId>;
    fn delete(&self, target: ObjectId) -> WorldResult<()>;
    fn set_invisible(&self, target: ObjectId, value: bool) -> WorldResult<()>;
    fn set_invulnerable(&self, target: ObjectId, value: bool) -> WorldResult<()>;
    fn set_speed(&self, target: ObjectId, value: u16) -> WorldResult<()>;
    fn teleport(&self, target: ObjectId, location: Location) -> WorldResult<()>;
    fn set_level(&self, target: ObjectId, level: u8) -> WorldResult<()>;
    fn give_item(&self, target: ObjectId, item_id: u32, count: i64) -> WorldResult<()>;

    /// Every command, success or failure, leaves a trace on the caller
    /// (spec §6: "writing a last-admin-message string onto the Player").
    fn set_last_admin_message(&self, caller: ObjectId, message: String);
}
