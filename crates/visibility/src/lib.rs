//! Visibility manager (spec §4.2): periodic LOD-aware view refresh per
//! player, a reverse "who observes X" index, fingerprint-based skip.

mod cache;
mod fingerprint;
mod manager;

pub use cache::{LodBucket, VisibilityCache};
pub use fingerprint::compute_fingerprint;
pub use manager::{
    RegisteredPlayer, TickOutcome, TickStats, UpdateOutcome, VisibilityManager, DEFAULT_MAX_AGE,
    DEFAULT_TICK_INTERVAL, PARALLEL_THRESHOLD,
};
