use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Composition-root configuration (ambient, spec §0/§7). Mirrors the
/// teacher's `game-config`/`game-config-fs` pair: a plain `serde`-derived
/// struct loaded from JSON on disk, falling back to defaults when the file
/// is absent rather than failing startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `sqlx` connection string for the offline-trade/olympiad
    /// `Repository`. `None` keeps the in-memory repository (the
    /// composition-root default, spec §6).
    pub database_url: Option<String>,

    /// Offline-trade TTL (spec §4.8 `maxDuration`); no concrete default is
    /// named in the source material, so this is an open-question decision
    /// (recorded in DESIGN.md): zero disables the timer entirely.
    pub offline_trade_max_duration_minutes: u64,

    /// `RUST_LOG`-style filter used when the `RUST_LOG` environment
    /// variable itself is unset.
    pub log_filter: String,

    /// Visibility manager tick interval override, in milliseconds.
    pub visibility_tick_millis: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            offline_trade_max_duration_minutes: 120,
            log_filter: "info".to_string(),
            visibility_tick_millis: visibility::DEFAULT_TICK_INTERVAL.as_millis() as u64,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from `path`. A missing file is not an error —
    /// it logs a warning and falls back to `ServerConfig::default()`, the
    /// same "lag by one tick, repair on next save" tolerance spec §7
    /// asks for elsewhere in the persistence story.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::warn!(target: "config", "{} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
        }
    }
}
