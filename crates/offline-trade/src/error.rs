use thiserror::Error;

use world_types::WorldError;

#[derive(Debug, Error)]
pub enum OfflineTradeError {
    #[error(transparent)]
    World(#[from] WorldError),
}
