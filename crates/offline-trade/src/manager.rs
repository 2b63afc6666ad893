use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use world_types::{ObjectId, WorldError, WorldResult};

use crate::trader::{NewTrader, Trader, TraderItem};

struct TraderEntry {
    char_id: u32,
    items: Mutex<Vec<TraderItem>>,
    cancel: CancellationToken,
}

/// In-memory table of suspended offline stores (spec §4.8). Persistence is
/// the caller's job via the `Repository` trait; this table only owns the
/// live timers and indices.
pub struct TraderTable {
    entries: Mutex<HashMap<ObjectId, Arc<TraderEntry>>>,
    char_index: Mutex<HashMap<u32, ObjectId>>,
    on_expire: Arc<dyn Fn(ObjectId) + Send + Sync>,
}

impl TraderTable {
    pub fn new(on_expire: Arc<dyn Fn(ObjectId) + Send + Sync>) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
            char_index: Mutex::new(HashMap::new()),
            on_expire,
        })
    }

    pub fn get_items(&self, object_id: ObjectId) -> Option<Vec<TraderItem>> {
        self.entries.lock().get(&object_id).map(|e| e.items.lock().clone())
    }

    pub fn object_id_for_char(&self, char_id: u32) -> Option<ObjectId> {
        self.char_index.lock().get(&char_id).copied()
    }

    pub fn contains(&self, object_id: ObjectId) -> bool {
        self.entries.lock().contains_key(&object_id)
    }

    /// Registers a new trader. `max_duration` of `None`/zero means no TTL.
    /// If `trader.started_at` is already further in the past than
    /// `max_duration` allows (crash recovery loading a stale row), this
    /// refuses with `AlreadyExpired` so the caller deletes the row from
    /// persistence instead of resurrecting it.
    pub fn add(
        self: &Arc<Self>,
        trader: NewTrader,
        max_duration: Option<Duration>,
    ) -> WorldResult<()> {
        if trader.items.is_empty() {
            return Err(WorldError::InvalidState("offline trader must have at least one item"));
        }

        if let Some(max_duration) = max_duration {
            if max_duration > Duration::ZERO {
                let age = Utc::now().signed_duration_since(trader.started_at);
                let age = age.to_std().unwrap_or(Duration::ZERO);
                if age >= max_duration {
                    return Err(WorldError::AlreadyExpired);
                }
            }
        }

        let object_id = trader.object_id;
        let char_id = trader.char_id;
        let entry = Arc::new(TraderEntry {
            char_id,
            items: Mutex::new(trader.items),
            cancel: CancellationToken::new(),
        });

        {
            let mut entries = self.entries.lock();
            let mut char_index = self.char_index.lock();
            entries.insert(object_id, entry.clone());
            char_index.insert(char_id, object_id);
        }
        log::info!(target: "offline_trade", "trader {object_id} (char {char_id}) opened");

        if let Some(max_duration) = max_duration {
            if max_duration > Duration::ZERO {
                let remaining = {
                    let age = Utc::now().signed_duration_since(trader.started_at);
                    let age = age.to_std().unwrap_or(Duration::ZERO);
                    max_duration.saturating_sub(age)
                };
                let table = self.clone();
                let cancel = entry.cancel.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => {}
                        _ = tokio::time::sleep(remaining) => {
                            table.handle_expire(object_id);
                        }
                    }
                });
            }
        }

        Ok(())
    }

    pub fn update_items(&self, object_id: ObjectId, items: Vec<TraderItem>) -> WorldResult<()> {
        let entries = self.entries.lock();
        let entry = entries
            .get(&object_id)
            .ok_or(WorldError::NotFound { kind: "trader", id: object_id })?;
        *entry.items.lock() = items;
        Ok(())
    }

    /// Removes the trader only if its item list is empty; returns whether
    /// the removal happened.
    pub fn remove_if_empty(&self, object_id: ObjectId) -> bool {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get(&object_id) else {
            return false;
        };
        if !entry.items.lock().is_empty() {
            return false;
        }
        let entry = entries.remove(&object_id).expect("just matched above");
        self.char_index.lock().remove(&entry.char_id);
        entry.cancel.cancel();
        true
    }

    fn handle_expire(&self, object_id: ObjectId) {
        let removed = {
            let mut entries = self.entries.lock();
            entries.remove(&object_id)
        };
        let Some(entry) = removed else {
            return;
        };
        self.char_index.lock().remove(&entry.char_id);
        entry.cancel.cancel();
        log::info!(target: "offline_trade", "trader {object_id} expired");
        (self.on_expire)(object_id);
    }

    pub fn stop_all(&self) {
        let mut entries = self.entries.lock();
        for entry in entries.values() {
            entry.cancel.cancel();
        }
        entries.clear();
        self.char_index.lock().clear();
    }
}
