use world_types::{ObjectId, WorldResult};

/// Collaborator the manager asks to read and write a player's karma/PK-kill
/// pair, keeping this crate free of any upward dependency on how the
/// caller represents a live player (mirrors `duel::ConditionRestorer`).
pub trait KarmaSink: Send + Sync {
    fn karma_and_pk(&self, id: ObjectId) -> WorldResult<(i64, u32)>;
    fn set_karma_and_pk(&self, id: ObjectId, karma: i64, pk_kills: u32) -> WorldResult<()>;
    fn bump_pk_kills(&self, id: ObjectId) -> WorldResult<()>;
}
