use thiserror::Error;

use crate::ids::ObjectId;

/// The error taxonomy named in spec §7, shared by every component so that
/// callers (admin commands, packet handlers, tick loops) can match on kind
/// rather than per-crate error types. Component-local error enums embed this
/// via `#[error(transparent)]` / `#[from]` rather than redefining the kinds.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("coordinate is outside the grid")]
    OutOfBounds,

    #[error("invalid state transition: {0}")]
    InvalidState(&'static str),

    #[error("not eligible: {0}")]
    NotEligible(&'static str),

    #[error("not found: {kind} {id}")]
    NotFound { kind: &'static str, id: ObjectId },

    #[error("conflict: {0}")]
    Conflict(&'static str),

    #[error("offline trader already expired before it was restored")]
    AlreadyExpired,

    #[error("repository temporarily unavailable: {0}")]
    Transient(#[from] anyhow::Error),
}

pub type WorldResult<T> = Result<T, WorldError>;
