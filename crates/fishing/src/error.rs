use thiserror::Error;

#[derive(Debug, Error)]
pub enum FishingError {
    #[error("the fishing minigame has already ended")]
    AlreadyEnded,
    #[error("the fishing tick loop was already stopped")]
    AlreadyStopped,
}
