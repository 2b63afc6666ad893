use std::collections::HashMap;

use parking_lot::RwLock;

use world_types::ObjectId;

/// No default is named in the source material for a freshly-created
/// noble's starting points; fixed here at 5 so a lazily-created noble can
/// register for either queue type without a separate grant step (open
/// question, recorded in DESIGN.md).
pub const DEFAULT_STARTING_POINTS: u32 = 5;

#[derive(Debug, Clone, Copy)]
pub struct Noble {
    pub object_id: ObjectId,
    pub class_id: u32,
    pub points: u32,
    pub comp_done: u32,
    pub comp_won: u32,
}

/// The per-cycle noble table (spec §4.7). Registration lazily creates an
/// entry on first use.
pub struct NobleTable {
    nobles: RwLock<HashMap<ObjectId, Noble>>,
}

impl NobleTable {
    pub fn new() -> Self {
        Self { nobles: RwLock::new(HashMap::new()) }
    }

    pub fn get_or_create(&self, object_id: ObjectId, class_id: u32) -> Noble {
        let mut nobles = self.nobles.write();
        *nobles.entry(object_id).or_insert(Noble {
            object_id,
            class_id,
            points: DEFAULT_STARTING_POINTS,
            comp_done: 0,
            comp_won: 0,
        })
    }

    pub fn get(&self, object_id: ObjectId) -> Option<Noble> {
        self.nobles.read().get(&object_id).copied()
    }

    pub fn apply_delta(&self, object_id: ObjectId, delta: i32) {
        let mut nobles = self.nobles.write();
        if let Some(n) = nobles.get_mut(&object_id) {
            n.points = (n.points as i32 + delta).max(0) as u32;
        }
    }

    pub fn record_game(&self, object_id: ObjectId, won: bool) {
        let mut nobles = self.nobles.write();
        if let Some(n) = nobles.get_mut(&object_id) {
            n.comp_done += 1;
            if won {
                n.comp_won += 1;
            }
        }
    }

    pub fn snapshot(&self) -> Vec<Noble> {
        self.nobles.read().values().copied().collect()
    }

    /// Weekly top-up (spec §4.7): +3 points, capped at `compDone*10 + 12`.
    /// No-op while in `Period::Validation` is the caller's responsibility
    /// to gate.
    pub fn weekly_topup(&self) {
        let mut nobles = self.nobles.write();
        for n in nobles.values_mut() {
            let cap = n.comp_done * 10 + 12;
            n.points = (n.points + 3).min(cap);
        }
    }
}

impl Default for NobleTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_create_then_delta_clamps_at_zero() {
        let table = NobleTable::new();
        table.get_or_create(1, 10);
        table.apply_delta(1, -100);
        assert_eq!(table.get(1).unwrap().points, 0);
    }

    #[test]
    fn weekly_topup_respects_cap() {
        let table = NobleTable::new();
        table.get_or_create(1, 10);
        table.apply_delta(1, 5); // points = 10
        // compDone = 0 -> cap = 12
        table.weekly_topup();
        assert_eq!(table.get(1).unwrap().points, 12);
        table.weekly_topup();
        assert_eq!(table.get(1).unwrap().points, 12, "capped, does not exceed compDone*10+12");
    }
}
