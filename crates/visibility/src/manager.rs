use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::{ArcSwap, ArcSwapOption};
use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use world_grid::{Grid, RegionCoord};
use world_types::{Location, ObjectId, WorldObjectHandle};

use crate::cache::{LodBucket, VisibilityCache};
use crate::fingerprint::compute_fingerprint;

/// How many players may be processed sequentially before the tick switches
/// to the parallel path (spec §4.2 step 2).
pub const PARALLEL_THRESHOLD: usize = 1000;
/// Default tick interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);
/// Cache max age before a forced rebuild, even with an unchanged fingerprint.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_millis(200);

const NEAR_CAPACITY: usize = 50;
const MEDIUM_CAPACITY: usize = 200;
const FAR_CAPACITY: usize = 200;

/// A player tracked by the visibility manager. The manager never touches
/// anything about a player besides their location and their cache slot —
/// this is intentionally decoupled from `world_types::Player` so that the
/// grid/visibility layer has no upward dependency on gameplay state.
pub struct RegisteredPlayer {
    pub object_id: ObjectId,
    location: Mutex<Location>,
    cache: ArcSwapOption<VisibilityCache>,
}

impl RegisteredPlayer {
    pub fn new(object_id: ObjectId, location: Location) -> Arc<Self> {
        Arc::new(Self {
            object_id,
            location: Mutex::new(location),
            cache: ArcSwapOption::from(None),
        })
    }

    pub fn set_location(&self, loc: Location) {
        *self.location.lock() = loc;
    }

    pub fn location(&self) -> Location {
        *self.location.lock()
    }

    pub fn cache(&self) -> Option<Arc<VisibilityCache>> {
        self.cache.load_full()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Skipped,
    Updated,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TickStats {
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ran,
    /// The tick loop observed cancellation and returned without processing.
    Cancelled,
}

/// Periodically rebuilds each registered player's `VisibilityCache` and the
/// reverse "who observes X" index (spec §4.2).
pub struct VisibilityManager {
    players: RwLock<HashMap<ObjectId, Arc<RegisteredPlayer>>>,
    reverse_index: ArcSwap<HashMap<ObjectId, Vec<ObjectId>>>,
    parallel_threshold: AtomicI32,
    max_age: Duration,
}

impl VisibilityManager {
    pub fn new() -> Self {
        Self::with_options(PARALLEL_THRESHOLD, DEFAULT_MAX_AGE)
    }

    pub fn with_options(parallel_threshold: usize, max_age: Duration) -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
            reverse_index: ArcSwap::from_pointee(HashMap::new()),
            parallel_threshold: AtomicI32::new(parallel_threshold as i32),
            max_age,
        }
    }

    pub fn register(&self, object_id: ObjectId, location: Location) -> Arc<RegisteredPlayer> {
        let player = RegisteredPlayer::new(object_id, location);
        self.players.write().insert(object_id, player.clone());
        log::debug!(target: "visibility", "registered {object_id}");
        player
    }

    /// Drops the player's registration and visibility cache.
    pub fn unregister(&self, object_id: ObjectId) {
        self.players.write().remove(&object_id);
        log::debug!(target: "visibility", "unregistered {object_id}");
    }

    pub fn player(&self, object_id: ObjectId) -> Option<Arc<RegisteredPlayer>> {
        self.players.read().get(&object_id).cloned()
    }

    pub fn registered_count(&self) -> usize {
        self.players.read().len()
    }

    /// Returns the observers of `object_id` as published by the last
    /// completed tick, or an empty slice if none or if no tick ran yet.
    pub fn observers_of(&self, object_id: ObjectId) -> Vec<ObjectId> {
        self.reverse_index
            .load()
            .get(&object_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Iterates a player's current cache in the requested bucket, or falls
    /// back to a direct grid query (bit-identical to `All`) if the cache is
    /// absent — e.g. the player just entered the world and the tick hasn't
    /// run for them yet.
    pub fn for_each_visible(
        &self,
        player: &RegisteredPlayer,
        grid: &Grid,
        bucket: LodBucket,
        f: impl FnMut(&WorldObjectHandle) -> bool,
    ) {
        match player.cache() {
            Some(cache) => cache.for_each(bucket, f),
            None => {
                if let Some(coord) = grid.coord_to_region(&player.location()) {
                    let (near, medium, far) = collect_buckets(grid, coord);
                    let cache = VisibilityCache {
                        near,
                        medium,
                        far,
                        region: coord,
                        region_fingerprint: 0,
                        built_at: Instant::now(),
                    };
                    cache.for_each(bucket, f);
                }
            }
        }
    }

    /// One full tick: refresh every registered player's cache (sequentially
    /// or in parallel depending on population), then rebuild the reverse
    /// index in a single pass. Honours `cancel`: if already cancelled, the
    /// tick does no work and returns `Cancelled`.
    pub fn tick(&self, grid: &Grid, cancel: &CancellationToken) -> TickOutcome {
        if cancel.is_cancelled() {
            return TickOutcome::Cancelled;
        }

        let players: Vec<Arc<RegisteredPlayer>> = self.players.read().values().cloned().collect();
        let now = Instant::now();
        let threshold = self.parallel_threshold.load(Ordering::Relaxed).max(0) as usize;
        let updated = AtomicI32::new(0);

        if players.len() < threshold {
            for p in &players {
                if self.update_player_cache(p, grid, now) == UpdateOutcome::Updated {
                    updated.fetch_add(1, Ordering::Relaxed);
                }
            }
        } else {
            let workers = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .max(1);
            let chunk_size = players.len().div_ceil(workers).max(1);
            rayon::scope(|scope| {
                for chunk in players.chunks(chunk_size) {
                    scope.spawn(|_| {
                        for p in chunk {
                            if self.update_player_cache(p, grid, now) == UpdateOutcome::Updated {
                                updated.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    });
                }
            });
        }

        self.rebuild_reverse_index(&players);
        let stats = TickStats {
            updated: updated.load(Ordering::Relaxed) as usize,
            skipped: players.len() - updated.load(Ordering::Relaxed) as usize,
        };
        log::trace!(target: "visibility", "tick over {} players: {} updated, {} skipped", players.len(), stats.updated, stats.skipped);
        TickOutcome::Ran
    }

    /// Implements spec §4.2 `updatePlayerCache`.
    pub fn update_player_cache(&self, player: &RegisteredPlayer, grid: &Grid, now: Instant) -> UpdateOutcome {
        let Some(coord) = grid.coord_to_region(&player.location()) else {
            return UpdateOutcome::Skipped;
        };

        if let Some(existing) = player.cache() {
            let age = now.saturating_duration_since(existing.built_at);
            if existing.region == coord && age <= self.max_age {
                let fingerprint = compute_fingerprint(grid, coord);
                if existing.region_fingerprint == fingerprint {
                    return UpdateOutcome::Skipped;
                }
            }
        }

        let (near, medium, far) = collect_buckets(grid, coord);
        let fingerprint = compute_fingerprint(grid, coord);
        let cache = Arc::new(VisibilityCache {
            near,
            medium,
            far,
            region: coord,
            region_fingerprint: fingerprint,
            built_at: now,
        });
        player.cache.store(Some(cache));
        UpdateOutcome::Updated
    }

    fn rebuild_reverse_index(&self, players: &[Arc<RegisteredPlayer>]) {
        let mut index: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
        for player in players {
            let Some(cache) = player.cache() else {
                continue;
            };
            cache.for_each(LodBucket::All, |obj| {
                index.entry(obj.id).or_default().push(player.object_id);
                true
            });
        }
        self.reverse_index.store(Arc::new(index));
    }
}

impl Default for VisibilityManager {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_buckets(
    grid: &Grid,
    coord: RegionCoord,
) -> (Vec<WorldObjectHandle>, Vec<WorldObjectHandle>, Vec<WorldObjectHandle>) {
    let mut near = Vec::with_capacity(NEAR_CAPACITY);
    let mut medium = Vec::with_capacity(MEDIUM_CAPACITY);
    let mut far = Vec::with_capacity(FAR_CAPACITY);

    let Some(region) = grid.region(coord) else {
        return (near, medium, far);
    };
    let neighbourhood = region.neighbourhood();

    near.extend(region.snapshot().iter().copied());
    for idx in neighbourhood.edges.iter().flatten() {
        medium.extend(grid.region_by_flat_index(*idx).snapshot().iter().copied());
    }
    for idx in neighbourhood.corners.iter().flatten() {
        far.extend(grid.region_by_flat_index(*idx).snapshot().iter().copied());
    }

    (near, medium, far)
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_types::{WorldExtent, WorldObjectKind, GRID_SHIFT};

    fn grid() -> Grid {
        Grid::new(WorldExtent {
            xmin: 0,
            xmax: 8 * (1i32 << GRID_SHIFT),
            ymin: 0,
            ymax: 8 * (1i32 << GRID_SHIFT),
        })
    }

    #[test]
    fn s1_visibility_skip_then_update() {
        let grid = grid();
        let manager = VisibilityManager::new();
        let loc = Location::new(150_000 % (8 * (1 << GRID_SHIFT)), 150_000 % (8 * (1 << GRID_SHIFT)), 0, 0);
        let player = manager.register(1, loc);

        let t0 = Instant::now();
        assert_eq!(manager.update_player_cache(&player, &grid, t0), UpdateOutcome::Updated);

        let t1 = t0 + Duration::from_millis(100);
        assert_eq!(manager.update_player_cache(&player, &grid, t1), UpdateOutcome::Skipped);
        let t2 = t1 + Duration::from_millis(100);
        assert_eq!(manager.update_player_cache(&player, &grid, t2), UpdateOutcome::Skipped);

        grid.add(WorldObjectHandle::new(100, WorldObjectKind::Npc, loc)).unwrap();
        let t3 = t2 + Duration::from_millis(100);
        assert_eq!(manager.update_player_cache(&player, &grid, t3), UpdateOutcome::Updated);
        let cache = player.cache().unwrap();
        assert_eq!(cache.near.len(), 1);
        assert_eq!(cache.near[0].id, 100);
    }

    #[test]
    fn reverse_index_round_trips() {
        let grid = grid();
        let manager = VisibilityManager::new();
        let loc = Location::new(10, 10, 0, 0);
        grid.add(WorldObjectHandle::new(1, WorldObjectKind::Player, loc)).unwrap();
        let player = manager.register(1, loc);

        let cancel = CancellationToken::new();
        manager.tick(&grid, &cancel);

        let observers = manager.observers_of(1);
        assert!(observers.contains(&player.object_id));
    }

    #[test]
    fn unregister_drops_cache() {
        let grid = grid();
        let manager = VisibilityManager::new();
        let player = manager.register(1, Location::new(1, 1, 0, 0));
        manager.update_player_cache(&player, &grid, Instant::now());
        assert!(player.cache().is_some());
        manager.unregister(1);
        assert!(manager.player(1).is_none());
    }

    #[test]
    fn cancelled_tick_does_nothing() {
        let grid = grid();
        let manager = VisibilityManager::new();
        manager.register(1, Location::new(1, 1, 0, 0));
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(manager.tick(&grid, &cancel), TickOutcome::Cancelled);
    }

    #[test]
    fn slow_path_matches_all_bucket() {
        let grid = grid();
        let manager = VisibilityManager::new();
        let loc = Location::new(10, 10, 0, 0);
        grid.add(WorldObjectHandle::new(2, WorldObjectKind::Npc, loc)).unwrap();
        let player = manager.register(1, loc);

        let mut seen = Vec::new();
        manager.for_each_visible(&player, &grid, LodBucket::All, |obj| {
            seen.push(obj.id);
            true
        });
        assert_eq!(seen, vec![2]);
    }
}
