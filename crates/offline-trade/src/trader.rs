use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use world_types::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreType {
    Sell,
    Buy,
    PackageSell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderItem {
    pub item_id: u32,
    pub count: i64,
    pub price: i64,
}

/// The passive, in-world entity left behind when a player with an open
/// private store disconnects (spec §4.8).
#[derive(Debug, Clone)]
pub struct Trader {
    pub object_id: ObjectId,
    pub char_id: u32,
    pub store_type: StoreType,
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub items: Vec<TraderItem>,
}

/// Parameters for registering a new trader; `started_at` is supplied by the
/// caller (not sampled here) so crash-recovery restores can pass the
/// persisted timestamp instead of "now".
#[derive(Debug, Clone)]
pub struct NewTrader {
    pub object_id: ObjectId,
    pub char_id: u32,
    pub store_type: StoreType,
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub items: Vec<TraderItem>,
}
