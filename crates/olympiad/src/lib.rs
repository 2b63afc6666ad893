//! Olympiad (spec §4.7): periods, matchmaking, the stadium pool, per-match
//! workers, noble/hero tables, and rank computation.

mod error;
mod game;
mod noble;
mod period;
mod queue;
mod ranks;
mod stadium;

mod manager;

pub use error::OlympiadError;
pub use game::{Game, GameId, GameResult, Side};
pub use manager::OlympiadManager;
pub use noble::{Noble, NobleTable, DEFAULT_STARTING_POINTS};
pub use period::{OlympiadClock, Period};
pub use queue::Queues;
pub use ranks::{compute_ranks, select_hero};
pub use stadium::StadiumPool;
