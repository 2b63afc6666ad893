use std::collections::HashMap;

/// Coarse candidate index over zone AABBs, distinct from the world grid's
/// region lattice (spec §4.3, §9). Cell side is wide relative to the world
/// grid's region size since zones are comparatively few and often large.
const CELL_SHIFT: u32 = 12; // 4096 units per cell

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellCoord {
    cx: i32,
    cy: i32,
}

fn cell_of(x: i32, y: i32) -> CellCoord {
    CellCoord { cx: x >> CELL_SHIFT, cy: y >> CELL_SHIFT }
}

pub struct SecondaryGrid {
    cells: HashMap<CellCoord, Vec<usize>>,
}

impl SecondaryGrid {
    /// Builds the index from each zone's `(minx, maxx, miny, maxy)` AABB,
    /// given as `(zone_index, aabb)` pairs.
    pub fn build(aabbs: &[(usize, (i32, i32, i32, i32))]) -> Self {
        let mut cells: HashMap<CellCoord, Vec<usize>> = HashMap::new();
        for &(zone_index, (minx, maxx, miny, maxy)) in aabbs {
            let lo = cell_of(minx, miny);
            let hi = cell_of(maxx, maxy);
            for cx in lo.cx..=hi.cx {
                for cy in lo.cy..=hi.cy {
                    cells.entry(CellCoord { cx, cy }).or_default().push(zone_index);
                }
            }
        }
        Self { cells }
    }

    /// Candidate zone indices whose AABB may contain `(x, y)`. Always a
    /// superset of the true containment set — callers must still call
    /// `ZoneShape::contains`.
    pub fn candidates(&self, x: i32, y: i32) -> &[usize] {
        self.cells.get(&cell_of(x, y)).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_include_zones_overlapping_cell() {
        let aabbs = vec![(0usize, (0, 10, 0, 10)), (1usize, (5000, 6000, 5000, 6000))];
        let grid = SecondaryGrid::build(&aabbs);
        assert_eq!(grid.candidates(5, 5), &[0]);
        assert_eq!(grid.candidates(5500, 5500), &[1]);
        assert!(grid.candidates(100_000, 100_000).is_empty());
    }

    #[test]
    fn zone_spanning_multiple_cells_appears_in_each() {
        let aabbs = vec![(0usize, (0, 9000, 0, 9000))];
        let grid = SecondaryGrid::build(&aabbs);
        assert_eq!(grid.candidates(10, 10), &[0]);
        assert_eq!(grid.candidates(8500, 8500), &[0]);
    }
}
