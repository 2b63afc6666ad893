//! Fishing combat (spec §4.5): a single-player minigame that depletes a
//! fish's hidden-mode HP within a time budget.

mod combat;
mod error;
mod state;
mod worker;

pub use combat::{FishParams, FishingCombat};
pub use error::FishingError;
pub use state::{Action, EndReason, FishMode, GoodUse, TickEvent};
pub use worker::{run_tick_loop, FishingSession};
