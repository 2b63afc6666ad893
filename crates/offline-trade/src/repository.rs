use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::trader::{StoreType, Trader, TraderItem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderRow {
    pub char_id: u32,
    pub created_at_seconds: i64,
    pub store_type: i16,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderItemRow {
    pub char_id: u32,
    pub item_identifier: i32,
    pub count: i64,
    pub price: i64,
}

fn store_type_to_i16(t: StoreType) -> i16 {
    match t {
        StoreType::Sell => 0,
        StoreType::Buy => 1,
        StoreType::PackageSell => 2,
    }
}

fn store_type_from_i16(v: i16) -> StoreType {
    match v {
        1 => StoreType::Buy,
        2 => StoreType::PackageSell,
        _ => StoreType::Sell,
    }
}

/// Persistence for offline traders (spec §6). A single trader's writes
/// must be serialised by the implementation; callers never interleave two
/// `save_trader` calls for the same `char_id` concurrently, but the trait
/// makes no assumption about cross-trader ordering.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn save_trader(&self, trader: &Trader) -> anyhow::Result<()>;
    async fn update_items(&self, char_id: u32, items: &[TraderItem]) -> anyhow::Result<()>;
    async fn delete_trader(&self, char_id: u32) -> anyhow::Result<()>;
    async fn load_all(&self) -> anyhow::Result<Vec<Trader>>;
    async fn delete_all(&self) -> anyhow::Result<()>;
}

struct InMemoryEntry {
    row: TraderRow,
    object_id: u32,
    items: Vec<TraderItem>,
}

/// Test-double / composition-root-default repository, grounded on the
/// teacher's `game-database` test-double pattern of keeping an in-memory
/// mirror of the same row shapes the real backend would persist.
pub struct InMemoryRepository {
    traders: Mutex<HashMap<u32, InMemoryEntry>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self { traders: Mutex::new(HashMap::new()) }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn save_trader(&self, trader: &Trader) -> anyhow::Result<()> {
        let mut traders = self.traders.lock();
        traders.insert(
            trader.char_id,
            InMemoryEntry {
                row: TraderRow {
                    char_id: trader.char_id,
                    created_at_seconds: trader.started_at.timestamp(),
                    store_type: store_type_to_i16(trader.store_type),
                    title: trader.title.clone(),
                },
                object_id: trader.object_id,
                items: trader.items.clone(),
            },
        );
        Ok(())
    }

    async fn update_items(&self, char_id: u32, items: &[TraderItem]) -> anyhow::Result<()> {
        let mut traders = self.traders.lock();
        if let Some(entry) = traders.get_mut(&char_id) {
            entry.items = items.to_vec();
        }
        Ok(())
    }

    async fn delete_trader(&self, char_id: u32) -> anyhow::Result<()> {
        self.traders.lock().remove(&char_id);
        Ok(())
    }

    async fn load_all(&self) -> anyhow::Result<Vec<Trader>> {
        let traders = self.traders.lock();
        Ok(traders
            .values()
            .map(|e| Trader {
                object_id: e.object_id,
                char_id: e.row.char_id,
                store_type: store_type_from_i16(e.row.store_type),
                title: e.row.title.clone(),
                started_at: seconds_to_datetime(e.row.created_at_seconds),
                items: e.items.clone(),
            })
            .collect())
    }

    async fn delete_all(&self) -> anyhow::Result<()> {
        self.traders.lock().clear();
        Ok(())
    }
}

fn seconds_to_datetime(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).single().unwrap_or_else(Utc::now)
}

/// `sqlx`-backed repository. The teacher's `lib/sql` pins `sqlx = "=0.6.3"`
/// against MySQL; we take the `sqlite` backend from the same crate's
/// `any`+`runtime-tokio-rustls`+`chrono` feature set instead, since no
/// reference deployment target was specified (see DESIGN.md).
pub struct SqlRepository {
    pool: AnyPool,
}

impl SqlRepository {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = AnyPoolOptions::new().max_connections(5).connect(database_url).await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS offline_traders (
                char_id INTEGER PRIMARY KEY,
                object_id INTEGER NOT NULL,
                created_at_seconds INTEGER NOT NULL,
                store_type INTEGER NOT NULL,
                title TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS offline_trader_items (
                char_id INTEGER NOT NULL,
                item_identifier INTEGER NOT NULL,
                count INTEGER NOT NULL,
                price INTEGER NOT NULL,
                FOREIGN KEY(char_id) REFERENCES offline_traders(char_id) ON DELETE CASCADE
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for SqlRepository {
    async fn save_trader(&self, trader: &Trader) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM offline_trader_items WHERE char_id = ?")
            .bind(trader.char_id as i64)
            .execute(&mut tx)
            .await?;
        sqlx::query(
            "INSERT OR REPLACE INTO offline_traders
                (char_id, object_id, created_at_seconds, store_type, title)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(trader.char_id as i64)
        .bind(trader.object_id as i64)
        .bind(trader.started_at.timestamp())
        .bind(store_type_to_i16(trader.store_type) as i64)
        .bind(trader.title.clone())
        .execute(&mut tx)
        .await?;
        for item in &trader.items {
            sqlx::query(
                "INSERT INTO offline_trader_items (char_id, item_identifier, count, price)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(trader.char_id as i64)
            .bind(item.item_id as i64)
            .bind(item.count)
            .bind(item.price)
            .execute(&mut tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn update_items(&self, char_id: u32, items: &[TraderItem]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM offline_trader_items WHERE char_id = ?")
            .bind(char_id as i64)
            .execute(&mut tx)
            .await?;
        for item in items {
            sqlx::query(
                "INSERT INTO offline_trader_items (char_id, item_identifier, count, price)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(char_id as i64)
            .bind(item.item_id as i64)
            .bind(item.count)
            .bind(item.price)
            .execute(&mut tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_trader(&self, char_id: u32) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM offline_traders WHERE char_id = ?")
            .bind(char_id as i64)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn load_all(&self) -> anyhow::Result<Vec<Trader>> {
        use sqlx::Row;

        let header_rows = sqlx::query("SELECT char_id, object_id, created_at_seconds, store_type, title FROM offline_traders")
            .fetch_all(&self.pool)
            .await?;

        let mut traders = Vec::with_capacity(header_rows.len());
        for row in header_rows {
            let char_id: i64 = row.try_get("char_id")?;
            let object_id: i64 = row.try_get("object_id")?;
            let created_at_seconds: i64 = row.try_get("created_at_seconds")?;
            let store_type: i64 = row.try_get("store_type")?;
            let title: String = row.try_get("title")?;

            let item_rows = sqlx::query(
                "SELECT item_identifier, count, price FROM offline_trader_items WHERE char_id = ?",
            )
            .bind(char_id)
            .fetch_all(&self.pool)
            .await?;
            let items = item_rows
                .into_iter()
                .map(|r| -> anyhow::Result<TraderItem> {
                    Ok(TraderItem {
                        item_id: r.try_get::<i64, _>("item_identifier")? as u32,
                        count: r.try_get("count")?,
                        price: r.try_get("price")?,
                    })
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            traders.push(Trader {
                object_id: object_id as u32,
                char_id: char_id as u32,
                store_type: store_type_from_i16(store_type as i16),
                title,
                started_at: seconds_to_datetime(created_at_seconds),
                items,
            });
        }
        Ok(traders)
    }

    async fn delete_all(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM offline_trader_items").execute(&self.pool).await?;
        sqlx::query("DELETE FROM offline_traders").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(char_id: u32) -> Trader {
        Trader {
            object_id: 100 + char_id,
            char_id,
            store_type: StoreType::Sell,
            title: "selling stuff".to_string(),
            started_at: Utc.timestamp_opt(1_700_000_000, 0).single().unwrap(),
            items: vec![TraderItem { item_id: 57, count: 10, price: 500 }],
        }
    }

    #[tokio::test]
    async fn in_memory_repository_round_trips_header_and_items() {
        let repo = InMemoryRepository::new();
        repo.save_trader(&sample(1)).await.unwrap();
        let all = repo.load_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].items.len(), 1);
        assert_eq!(all[0].items[0].item_id, 57);
    }

    #[tokio::test]
    async fn update_items_replaces_without_touching_header() {
        let repo = InMemoryRepository::new();
        repo.save_trader(&sample(1)).await.unwrap();
        repo.update_items(1, &[TraderItem { item_id: 99, count: 1, price: 1 }]).await.unwrap();
        let all = repo.load_all().await.unwrap();
        assert_eq!(all[0].items.len(), 1);
        assert_eq!(all[0].items[0].item_id, 99);
    }

    #[tokio::test]
    async fn delete_trader_removes_it_from_load_all() {
        let repo = InMemoryRepository::new();
        repo.save_trader(&sample(1)).await.unwrap();
        repo.delete_trader(1).await.unwrap();
        assert!(repo.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_all_clears_everything() {
        let repo = InMemoryRepository::new();
        repo.save_trader(&sample(1)).await.unwrap();
        repo.save_trader(&sample(2)).await.unwrap();
        repo.delete_all().await.unwrap();
        assert!(repo.load_all().await.unwrap().is_empty());
    }
}
