use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;

use world_types::{ObjectId, WorldObjectHandle};

/// Integer region indices `(rx, ry)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionCoord {
    pub rx: i32,
    pub ry: i32,
}

/// The 3x3 neighbourhood of a region, computed once at grid init and never
/// mutated afterwards (spec §4.1 "performance contract"). Edge- and
/// corner-adjacent neighbours are kept apart because the visibility
/// manager's LOD buckets depend on the distinction (medium = edge-adjacent,
/// far = corner-adjacent).
#[derive(Debug, Clone)]
pub struct Neighbourhood {
    pub center: usize,
    /// North, south, east, west — clipped at the grid edge.
    pub edges: [Option<usize>; 4],
    /// NE, NW, SE, SW — clipped at the grid edge.
    pub corners: [Option<usize>; 4],
}

impl Neighbourhood {
    pub fn all_indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::once(Some(self.center))
            .chain(self.edges.iter().copied())
            .chain(self.corners.iter().copied())
            .flatten()
    }
}

/// A cell of the grid. Holds the set of objects currently inside its square
/// footprint, a monotone version counter, and a lazily rebuilt immutable
/// snapshot.
pub struct Region {
    pub coord: RegionCoord,
    objects: Mutex<HashMap<ObjectId, WorldObjectHandle>>,
    version: AtomicU64,
    dirty: AtomicBool,
    snapshot: ArcSwap<Vec<WorldObjectHandle>>,
    pub(crate) neighbourhood: Neighbourhood,
}

impl Region {
    pub(crate) fn new(coord: RegionCoord, neighbourhood: Neighbourhood) -> Self {
        Self {
            coord,
            objects: Mutex::new(HashMap::new()),
            version: AtomicU64::new(0),
            dirty: AtomicBool::new(false),
            snapshot: ArcSwap::from_pointee(Vec::new()),
            neighbourhood,
        }
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn neighbourhood(&self) -> &Neighbourhood {
        &self.neighbourhood
    }

    pub(crate) fn insert(&self, handle: WorldObjectHandle) {
        self.objects.lock().insert(handle.id, handle);
        self.version.fetch_add(1, Ordering::AcqRel);
        self.dirty.store(true, Ordering::Release);
    }

    pub(crate) fn remove(&self, id: ObjectId) -> Option<WorldObjectHandle> {
        let removed = self.objects.lock().remove(&id);
        if removed.is_some() {
            self.version.fetch_add(1, Ordering::AcqRel);
            self.dirty.store(true, Ordering::Release);
        }
        removed
    }

    /// Updates the stored handle for an object that moved but stayed within
    /// this region. Per spec §4.1 this is *not* a region mutation: the
    /// object set membership is unchanged, so neither `version` nor the
    /// dirty flag is touched, and the already-published snapshot is allowed
    /// to go briefly stale (bounded by the visibility manager's tick TTL).
    pub(crate) fn update_location(&self, handle: WorldObjectHandle) {
        if let Some(existing) = self.objects.lock().get_mut(&handle.id) {
            existing.location = handle.location;
        }
    }

    pub fn len(&self) -> usize {
        self.objects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Immutable slice view of this region's contents, rebuilt lazily: if
    /// nothing changed since the last call, the previously published `Arc`
    /// is returned with no allocation (spec §8 property 3).
    pub fn snapshot(&self) -> Arc<Vec<WorldObjectHandle>> {
        if self
            .dirty
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let fresh: Vec<WorldObjectHandle> = self.objects.lock().values().copied().collect();
            self.snapshot.store(Arc::new(fresh));
        }
        self.snapshot.load_full()
    }
}
