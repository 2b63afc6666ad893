use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use admin_console::CommandRegistry;
use cursed_weapon::{CursedWeapon, CursedWeaponManager, WeaponConfig, WeaponId};
use duel::DuelManager;
use offline_trade::{InMemoryRepository, Repository, TraderTable};
use olympiad::OlympiadManager;
use visibility::VisibilityManager;
use world_grid::Grid;
use world_types::WorldExtent;
use zone_engine::ZoneEngine;

use crate::config::ServerConfig;
use crate::context::WorldkeepContext;

/// Ties every component crate together into one running process (ambient
/// composition root, spec §0). Owns the background tick workers and their
/// shared cancellation token; nothing here understands wire bytes — that
/// is an explicit Non-goal (spec §1).
pub struct Worldkeep {
    pub grid: Arc<Grid>,
    pub visibility: Arc<VisibilityManager>,
    pub zones: Arc<ZoneEngine>,
    pub duels: Arc<DuelManager>,
    pub cursed_weapons: Arc<CursedWeaponManager>,
    pub olympiad: Arc<OlympiadManager>,
    pub offline_trade: Arc<TraderTable>,
    pub admin: Arc<CommandRegistry>,
    pub repository: Arc<dyn Repository>,
    pub context: Arc<WorldkeepContext>,
    tick_interval: Duration,
    shutdown: CancellationToken,
}

impl Worldkeep {
    pub async fn build(config: &ServerConfig) -> anyhow::Result<Self> {
        let grid = Arc::new(Grid::new(WorldExtent::STANDARD));
        let visibility = Arc::new(VisibilityManager::new());
        // Zone layout is content data (spec §1 Non-goals: "content data
        // loaders"); the engine starts with none registered.
        let zones = Arc::new(ZoneEngine::new(Vec::new()));
        let duels = Arc::new(DuelManager::new());
        let context = WorldkeepContext::new(grid.clone());

        let cursed_weapons = Arc::new(CursedWeaponManager::new(vec![
            Arc::new(CursedWeapon::new(WeaponId::Zariche, WeaponConfig::default())),
            Arc::new(CursedWeapon::new(WeaponId::Akamanah, WeaponConfig::default())),
        ]));
        let olympiad = Arc::new(OlympiadManager::new());

        let repository: Arc<dyn Repository> = match &config.database_url {
            Some(url) => {
                let sql = offline_trade::SqlRepository::connect(url).await?;
                sql.migrate().await?;
                Arc::new(sql)
            }
            None => Arc::new(InMemoryRepository::new()),
        };

        let offline_trade = TraderTable::new(Arc::new(|object_id| {
            log::debug!(target: "offline_trade", "expiry callback ran for trader {object_id}");
        }));

        let admin = Arc::new(CommandRegistry::new());

        Ok(Self {
            grid,
            visibility,
            zones,
            duels,
            cursed_weapons,
            olympiad,
            offline_trade,
            admin,
            repository,
            context,
            tick_interval: Duration::from_millis(config.visibility_tick_millis),
            shutdown: CancellationToken::new(),
        })
    }

    /// Spawns the tick-driven background workers (spec §5): visibility
    /// refresh and cursed-weapon expiry. Per-entity workers (duels,
    /// olympiad games, fishing combats, offline-trader timers) are spawned
    /// individually as those entities are created, not here.
    pub fn spawn_background_workers(&self) {
        let visibility = self.visibility.clone();
        let grid = self.grid.clone();
        let cancel = self.shutdown.clone();
        let tick_interval = self.tick_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick_interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if visibility.tick(&grid, &cancel) == visibility::TickOutcome::Cancelled {
                            break;
                        }
                    }
                }
            }
        });

        let cursed_weapons = self.cursed_weapons.clone();
        let karma_sink = self.context.clone();
        let cancel = self.shutdown.clone();
        tokio::spawn(async move {
            cursed_weapons.run_expiry_ticker(karma_sink, cancel).await;
        });
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.offline_trade.stop_all();
    }
}
