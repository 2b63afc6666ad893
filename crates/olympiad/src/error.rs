use thiserror::Error;

#[derive(Debug, Error)]
pub enum OlympiadError {
    #[error("not eligible: {0}")]
    NotEligible(&'static str),
    #[error("already queued for a match")]
    AlreadyQueued,
    #[error("no free stadium slot")]
    NoFreeStadium,
}
