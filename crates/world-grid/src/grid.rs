use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use world_types::{Location, ObjectId, WorldExtent, WorldObjectHandle, WorldObjectKind, GRID_SHIFT};

use crate::region::{Neighbourhood, Region, RegionCoord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("coordinate is outside the grid")]
    OutOfBounds,
}

/// The world grid: fixed-size square regions indexed by `(rx, ry)`, backing
/// every "what is near me" query in the system (spec §4.1).
pub struct Grid {
    extent: WorldExtent,
    dim_x: i32,
    dim_y: i32,
    offset_x: i32,
    offset_y: i32,
    regions: Vec<Region>,

    /// World-level id -> last known location, needed by `Remove`/`MoveTo`
    /// to find which region an object is currently in without scanning.
    locations: RwLock<HashMap<ObjectId, (Location, WorldObjectKind)>>,
    /// Fast kind-specific lookup, maintained alongside the region maps.
    npcs: RwLock<HashMap<ObjectId, WorldObjectHandle>>,
}

impl Grid {
    pub fn new(extent: WorldExtent) -> Self {
        let span = 1i32 << GRID_SHIFT;
        let dim_x = (extent.xmax - extent.xmin) / span;
        let dim_y = (extent.ymax - extent.ymin) / span;
        let offset_x = -(extent.xmin >> GRID_SHIFT);
        let offset_y = -(extent.ymin >> GRID_SHIFT);

        let mut regions = Vec::with_capacity((dim_x * dim_y) as usize);
        for ry in 0..dim_y {
            for rx in 0..dim_x {
                // Neighbourhood is filled in below once every region exists;
                // placeholder here, immutable from the moment `new` returns.
                regions.push(Region::new(
                    RegionCoord { rx, ry },
                    Neighbourhood {
                        center: 0,
                        edges: [None; 4],
                        corners: [None; 4],
                    },
                ));
            }
        }

        let index_of = |rx: i32, ry: i32| -> Option<usize> {
            if rx >= 0 && rx < dim_x && ry >= 0 && ry < dim_y {
                Some((ry * dim_x + rx) as usize)
            } else {
                None
            }
        };

        let neighbourhoods: Vec<Neighbourhood> = (0..dim_y)
            .flat_map(|ry| (0..dim_x).map(move |rx| (rx, ry)))
            .map(|(rx, ry)| Neighbourhood {
                center: index_of(rx, ry).unwrap(),
                edges: [
                    index_of(rx, ry - 1), // north
                    index_of(rx, ry + 1), // south
                    index_of(rx + 1, ry), // east
                    index_of(rx - 1, ry), // west
                ],
                corners: [
                    index_of(rx + 1, ry - 1), // NE
                    index_of(rx - 1, ry - 1), // NW
                    index_of(rx + 1, ry + 1), // SE
                    index_of(rx - 1, ry + 1), // SW
                ],
            })
            .collect();

        for (region, neighbourhood) in regions.iter_mut().zip(neighbourhoods) {
            region.neighbourhood = neighbourhood;
        }

        Self {
            extent,
            dim_x,
            dim_y,
            offset_x,
            offset_y,
            regions,
            locations: RwLock::new(HashMap::new()),
            npcs: RwLock::new(HashMap::new()),
        }
    }

    pub fn dimensions(&self) -> (i32, i32) {
        (self.dim_x, self.dim_y)
    }

    pub fn extent(&self) -> WorldExtent {
        self.extent
    }

    /// `rx = (x >> k) + offsetX`, `ry = (y >> k) + offsetY`. Returns `None`
    /// for coordinates outside the grid ("nil region").
    pub fn coord_to_region(&self, loc: &Location) -> Option<RegionCoord> {
        let rx = (loc.x >> GRID_SHIFT) + self.offset_x;
        let ry = (loc.y >> GRID_SHIFT) + self.offset_y;
        if rx >= 0 && rx < self.dim_x && ry >= 0 && ry < self.dim_y {
            Some(RegionCoord { rx, ry })
        } else {
            None
        }
    }

    /// Inverse of `coord_to_region`: the world-space origin (minimum
    /// corner) of a region index.
    pub fn region_to_coord(&self, coord: RegionCoord) -> Location {
        let span = 1i32 << GRID_SHIFT;
        Location::new(
            (coord.rx - self.offset_x) * span,
            (coord.ry - self.offset_y) * span,
            0,
            0,
        )
    }

    fn flat_index(&self, coord: RegionCoord) -> usize {
        (coord.ry * self.dim_x + coord.rx) as usize
    }

    pub fn region_at(&self, loc: &Location) -> Option<&Region> {
        let coord = self.coord_to_region(loc)?;
        Some(&self.regions[self.flat_index(coord)])
    }

    pub fn region(&self, coord: RegionCoord) -> Option<&Region> {
        if coord.rx >= 0 && coord.rx < self.dim_x && coord.ry >= 0 && coord.ry < self.dim_y {
            Some(&self.regions[self.flat_index(coord)])
        } else {
            None
        }
    }

    fn region_by_index(&self, idx: usize) -> &Region {
        &self.regions[idx]
    }

    /// Resolves a flat neighbourhood index (as stored in `Neighbourhood`)
    /// back to its region. Used by the visibility manager's fingerprint
    /// computation, which walks `Region::neighbourhood()` directly.
    pub fn region_by_flat_index(&self, idx: usize) -> &Region {
        &self.regions[idx]
    }

    /// Resolves a region's neighbourhood into concrete `&Region`s, reading
    /// the immutable index array computed once at construction.
    pub fn neighbours_of(&self, coord: RegionCoord) -> Option<Vec<&Region>> {
        let region = self.region(coord)?;
        Some(
            region
                .neighbourhood()
                .all_indices()
                .map(|idx| self.region_by_index(idx))
                .collect(),
        )
    }

    pub fn add(&self, handle: WorldObjectHandle) -> Result<(), GridError> {
        let Some(region) = self.region_at(&handle.location) else {
            log::warn!(target: "grid", "add: {} at {:?} is out of bounds", handle.id, handle.location);
            return Err(GridError::OutOfBounds);
        };
        region.insert(handle);
        self.locations
            .write()
            .insert(handle.id, (handle.location, handle.kind));
        if matches!(handle.kind, WorldObjectKind::Npc | WorldObjectKind::Monster) {
            self.npcs.write().insert(handle.id, handle);
        }
        Ok(())
    }

    /// Safe if the object is absent.
    pub fn remove(&self, id: ObjectId) {
        let Some((loc, _kind)) = self.locations.write().remove(&id) else {
            return;
        };
        if let Some(region) = self.region_at(&loc) {
            region.remove(id);
        }
        self.npcs.write().remove(&id);
        log::debug!(target: "grid", "removed {id} from {loc:?}");
    }

    /// Moves an object to `new_loc`. Crosses regions only if necessary;
    /// within the same region this only refreshes the stored location.
    pub fn move_to(&self, id: ObjectId, new_loc: Location) -> Result<(), GridError> {
        let (old_loc, kind) = {
            let locations = self.locations.read();
            match locations.get(&id) {
                Some(v) => *v,
                None => return Err(GridError::OutOfBounds),
            }
        };

        let old_coord = self.coord_to_region(&old_loc);
        let new_coord = self.coord_to_region(&new_loc).ok_or(GridError::OutOfBounds)?;

        let handle = WorldObjectHandle::new(id, kind, new_loc);

        if old_coord != Some(new_coord) {
            if let Some(old_region) = old_coord.and_then(|c| self.region(c)) {
                old_region.remove(id);
            }
            self.region(new_coord).unwrap().insert(handle);
            log::trace!(target: "grid", "{id} crossed region {old_coord:?} -> {new_coord:?}, bumping both versions");
        } else if let Some(region) = self.region(new_coord) {
            region.update_location(handle);
        }

        self.locations.write().insert(id, (new_loc, kind));
        if matches!(kind, WorldObjectKind::Npc | WorldObjectKind::Monster) {
            self.npcs.write().insert(id, handle);
        }
        Ok(())
    }

    pub fn get_npc(&self, id: ObjectId) -> Option<WorldObjectHandle> {
        self.npcs.read().get(&id).copied()
    }

    pub fn location_of(&self, id: ObjectId) -> Option<Location> {
        self.locations.read().get(&id).map(|(loc, _)| *loc)
    }
}
