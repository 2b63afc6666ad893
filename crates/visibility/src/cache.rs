use std::time::Instant;

use world_grid::RegionCoord;
use world_types::WorldObjectHandle;

/// LOD bucket a caller asks `ForEachVisible` to iterate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LodBucket {
    Near,
    Medium,
    Far,
    All,
}

/// One player's immutable, atomically-published view of the world around
/// them (spec §3, §4.2). Never mutated in place; a new one replaces the old
/// on every real update.
#[derive(Debug, Clone)]
pub struct VisibilityCache {
    pub near: Vec<WorldObjectHandle>,
    pub medium: Vec<WorldObjectHandle>,
    pub far: Vec<WorldObjectHandle>,
    pub region: RegionCoord,
    pub region_fingerprint: u64,
    pub built_at: Instant,
}

impl VisibilityCache {
    pub fn for_each(&self, bucket: LodBucket, mut f: impl FnMut(&WorldObjectHandle) -> bool) {
        let buckets: &[&[WorldObjectHandle]] = match bucket {
            LodBucket::Near => &[&self.near],
            LodBucket::Medium => &[&self.medium],
            LodBucket::Far => &[&self.far],
            LodBucket::All => &[&self.near, &self.medium, &self.far],
        };
        for b in buckets {
            for obj in b.iter() {
                if !f(obj) {
                    return;
                }
            }
        }
    }

    pub fn len(&self, bucket: LodBucket) -> usize {
        match bucket {
            LodBucket::Near => self.near.len(),
            LodBucket::Medium => self.medium.len(),
            LodBucket::Far => self.far.len(),
            LodBucket::All => self.near.len() + self.medium.len() + self.far.len(),
        }
    }
}
