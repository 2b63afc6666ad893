use thiserror::Error;

use world_types::WorldError;

#[derive(Debug, Error)]
pub enum CursedWeaponError {
    #[error("weapon is already activated")]
    AlreadyActive,
    #[error("weapon is not currently activated")]
    NotActivated,
    #[error("player already holds a different cursed weapon")]
    AlreadyHoldingAnother,
    #[error(transparent)]
    World(#[from] WorldError),
}
