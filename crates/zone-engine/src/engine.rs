use world_types::{Location, ObjectId, ZoneFlags};

use crate::secondary_grid::SecondaryGrid;
use crate::zone::{Zone, ZoneId, ZoneKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneTransition {
    Enter(ZoneId, ZoneKind),
    Exit(ZoneId, ZoneKind),
}

/// Owns every zone and the coarse index used to find containment
/// candidates for a point (spec §4.3).
pub struct ZoneEngine {
    zones: Vec<Zone>,
    secondary_grid: SecondaryGrid,
}

impl ZoneEngine {
    pub fn new(zones: Vec<Zone>) -> Self {
        let aabbs: Vec<(usize, (i32, i32, i32, i32))> =
            zones.iter().enumerate().map(|(i, z)| (i, z.shape.aabb())).collect();
        let secondary_grid = SecondaryGrid::build(&aabbs);
        Self { zones, secondary_grid }
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    fn candidate_indices(&self, loc: &Location) -> &[usize] {
        self.secondary_grid.candidates(loc.x, loc.y)
    }

    /// Zone indices from the secondary grid that truly contain `loc`.
    fn containing_indices(&self, loc: &Location) -> Vec<usize> {
        self.candidate_indices(loc)
            .iter()
            .copied()
            .filter(|&i| self.zones[i].shape.contains(loc))
            .collect()
    }

    /// Moves `object_id` from `old_loc` to `new_loc`, updating each zone's
    /// membership set and `flags` in place, and returns the transitions that
    /// occurred. `old_loc` is `None` for a fresh spawn (nothing to exit).
    ///
    /// Flag correctness under overlap: a naive "clear the flag on exit, set
    /// it on enter" applied per-transition is wrong when two zones of the
    /// same kind overlap — exiting one would clear a bit the other zone
    /// still legitimately holds. Instead this computes the complete set of
    /// kinds active at `new_loc` and the set of kinds touched by *either*
    /// location's candidates, then clears the touched bits and sets the
    /// active ones as a single update.
    pub fn dispatch(
        &self,
        object_id: ObjectId,
        new_loc: &Location,
        old_loc: Option<&Location>,
        flags: &mut ZoneFlags,
    ) -> Vec<ZoneTransition> {
        let new_containing = self.containing_indices(new_loc);
        let old_containing = old_loc.map(|l| self.containing_indices(l)).unwrap_or_default();

        let mut transitions = Vec::new();

        for &idx in &old_containing {
            if !new_containing.contains(&idx) {
                let zone = &self.zones[idx];
                if zone.remove_member(object_id) {
                    transitions.push(ZoneTransition::Exit(zone.id, zone.kind));
                }
            }
        }
        for &idx in &new_containing {
            if !old_containing.contains(&idx) {
                let zone = &self.zones[idx];
                if zone.add_member(object_id) {
                    transitions.push(ZoneTransition::Enter(zone.id, zone.kind));
                }
            }
        }

        let mut touched_bits = 0u64;
        for &idx in self.candidate_indices(new_loc).iter().chain(
            old_loc.map(|l| self.candidate_indices(l)).unwrap_or(&[]),
        ) {
            touched_bits |= self.zones[idx].kind.flag_bits();
        }

        let mut active_bits = 0u64;
        for &idx in &new_containing {
            active_bits |= self.zones[idx].kind.flag_bits();
        }

        flags.clear(touched_bits);
        flags.set(active_bits);

        transitions
    }

    /// Removes `object_id` from every zone that currently lists it and
    /// clears every bit any such zone owns. Used on logout/despawn.
    pub fn clear_all(&self, object_id: ObjectId, flags: &mut ZoneFlags) -> Vec<ZoneTransition> {
        let mut transitions = Vec::new();
        let mut cleared_bits = 0u64;
        for zone in &self.zones {
            if zone.remove_member(object_id) {
                transitions.push(ZoneTransition::Exit(zone.id, zone.kind));
                cleared_bits |= zone.kind.flag_bits();
            }
        }
        flags.clear(cleared_bits);
        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ZoneShape;
    use crate::zone::ZoneParams;

    fn square_zone(id: u32, kind: ZoneKind, x0: i32, y0: i32, x1: i32, y1: i32) -> Zone {
        Zone::new(
            ZoneId(id),
            ZoneShape::Cuboid { vertices: vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)], min_z: -100, max_z: 100 },
            kind,
            ZoneParams::default(),
        )
    }

    fn loc(x: i32, y: i32) -> Location {
        Location::new(x, y, 0, 0)
    }

    #[test]
    fn enter_sets_flag_and_records_transition() {
        let engine = ZoneEngine::new(vec![square_zone(1, ZoneKind::PvP, 0, 0, 100, 100)]);
        let mut flags = ZoneFlags::default();
        let t = engine.dispatch(1, &loc(5, 5), None, &mut flags);
        assert_eq!(t, vec![ZoneTransition::Enter(ZoneId(1), ZoneKind::PvP)]);
        assert!(flags.has(ZoneFlags::PVP));
    }

    #[test]
    fn exit_clears_flag_when_no_other_zone_holds_it() {
        let engine = ZoneEngine::new(vec![square_zone(1, ZoneKind::PvP, 0, 0, 100, 100)]);
        let mut flags = ZoneFlags::default();
        engine.dispatch(1, &loc(5, 5), None, &mut flags);
        let t = engine.dispatch(1, &loc(500, 500), Some(&loc(5, 5)), &mut flags);
        assert_eq!(t, vec![ZoneTransition::Exit(ZoneId(1), ZoneKind::PvP)]);
        assert!(!flags.has(ZoneFlags::PVP));
    }

    #[test]
    fn overlapping_same_kind_zones_do_not_spuriously_clear() {
        // two overlapping PvP zones; moving out of one but still inside the
        // other must keep PVP set and must not emit a spurious Exit for the
        // zone we never left.
        let engine = ZoneEngine::new(vec![
            square_zone(1, ZoneKind::PvP, 0, 0, 100, 100),
            square_zone(2, ZoneKind::PvP, 50, 0, 150, 100),
        ]);
        let mut flags = ZoneFlags::default();
        // enters both zones at once (overlap region)
        let t0 = engine.dispatch(1, &loc(75, 5), None, &mut flags);
        assert_eq!(t0.len(), 2);
        assert!(flags.has(ZoneFlags::PVP));

        // move to a point inside zone 2 only
        let t1 = engine.dispatch(1, &loc(120, 5), Some(&loc(75, 5)), &mut flags);
        assert_eq!(t1, vec![ZoneTransition::Exit(ZoneId(1), ZoneKind::PvP)]);
        assert!(flags.has(ZoneFlags::PVP), "zone 2 still covers this point");
    }

    #[test]
    fn clear_all_removes_every_membership() {
        let engine = ZoneEngine::new(vec![
            square_zone(1, ZoneKind::PvP, 0, 0, 100, 100),
            square_zone(2, ZoneKind::Peace, 0, 0, 100, 100),
        ]);
        let mut flags = ZoneFlags::default();
        engine.dispatch(1, &loc(5, 5), None, &mut flags);
        assert!(flags.has(ZoneFlags::PVP) && flags.has(ZoneFlags::PEACE));

        let t = engine.clear_all(1, &mut flags);
        assert_eq!(t.len(), 2);
        assert_eq!(flags.0, 0);
        assert!(!engine.zone(ZoneId(1)).unwrap().contains_member(1));
    }

    #[test]
    fn fresh_spawn_has_no_exits() {
        let engine = ZoneEngine::new(vec![square_zone(1, ZoneKind::Town, 0, 0, 100, 100)]);
        let mut flags = ZoneFlags::default();
        let t = engine.dispatch(1, &loc(10, 10), None, &mut flags);
        assert!(t.iter().all(|tr| matches!(tr, ZoneTransition::Enter(..))));
    }
}
