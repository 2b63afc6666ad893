use thiserror::Error;

use world_types::WorldError;

#[derive(Debug, Error)]
pub enum DuelError {
    #[error("{0} is already in a duel")]
    AlreadyInDuel(world_types::ObjectId),
    #[error("not eligible: {0}")]
    NotEligible(&'static str),
    #[error(transparent)]
    World(#[from] WorldError),
}
