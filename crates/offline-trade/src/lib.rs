//! Offline Trade Table (spec §4.8) and the persistence `Repository`
//! interface it relies on (spec §6).

mod error;
mod manager;
mod repository;
mod trader;

pub use error::OfflineTradeError;
pub use manager::TraderTable;
pub use repository::{InMemoryRepository, Repository, SqlRepository, TraderItemRow, TraderRow};
pub use trader::{NewTrader, StoreType, Trader, TraderItem};
