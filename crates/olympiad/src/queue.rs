use std::collections::{BTreeMap, HashSet};

use parking_lot::Mutex;

use world_types::ObjectId;

use crate::error::OlympiadError;

/// A non-classed game only forms once this many players are waiting.
pub const NON_CLASSED_MIN_WAITING: usize = 9;
/// A classed game only forms once this many players of the same class are
/// waiting.
pub const CLASSED_MIN_WAITING: usize = 5;

/// Matchmaking queues (spec §4.7). Classed queues are keyed by class id in
/// a `BTreeMap` so matchmaking walks classes in a stable, deterministic
/// order instead of hash order.
pub struct Queues {
    non_classed: Mutex<Vec<ObjectId>>,
    classed: Mutex<BTreeMap<u32, Vec<ObjectId>>>,
    queued: Mutex<HashSet<ObjectId>>,
}

impl Queues {
    pub fn new() -> Self {
        Self {
            non_classed: Mutex::new(Vec::new()),
            classed: Mutex::new(BTreeMap::new()),
            queued: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_queued(&self, object_id: ObjectId) -> bool {
        self.queued.lock().contains(&object_id)
    }

    pub fn join_non_classed(&self, object_id: ObjectId) -> Result<(), OlympiadError> {
        let mut queued = self.queued.lock();
        if !queued.insert(object_id) {
            return Err(OlympiadError::AlreadyQueued);
        }
        self.non_classed.lock().push(object_id);
        Ok(())
    }

    pub fn join_classed(&self, object_id: ObjectId, class_id: u32) -> Result<(), OlympiadError> {
        let mut queued = self.queued.lock();
        if !queued.insert(object_id) {
            return Err(OlympiadError::AlreadyQueued);
        }
        self.classed.lock().entry(class_id).or_default().push(object_id);
        Ok(())
    }

    pub fn leave(&self, object_id: ObjectId) {
        self.queued.lock().remove(&object_id);
        self.non_classed.lock().retain(|&id| id != object_id);
        for members in self.classed.lock().values_mut() {
            members.retain(|&id| id != object_id);
        }
    }

    /// Pops a pair from the non-classed queue, if at least
    /// `NON_CLASSED_MIN_WAITING` are waiting (spec's non-classed matchmaking
    /// threshold).
    pub fn pop_non_classed_pair(&self) -> Option<(ObjectId, ObjectId)> {
        let mut q = self.non_classed.lock();
        if q.len() < NON_CLASSED_MIN_WAITING {
            return None;
        }
        let p1 = q.remove(0);
        let p2 = q.remove(0);
        drop(q);
        let mut queued = self.queued.lock();
        queued.remove(&p1);
        queued.remove(&p2);
        Some((p1, p2))
    }

    /// Pops a pair from the same class, walking classes in ascending order
    /// and returning the first class with at least `CLASSED_MIN_WAITING`
    /// waiting (spec's classed matchmaking threshold).
    pub fn pop_classed_pair(&self) -> Option<(ObjectId, ObjectId, u32)> {
        let mut classed = self.classed.lock();
        for (&class_id, members) in classed.iter_mut() {
            if members.len() >= CLASSED_MIN_WAITING {
                let p1 = members.remove(0);
                let p2 = members.remove(0);
                drop(classed);
                let mut queued = self.queued.lock();
                queued.remove(&p1);
                queued.remove(&p2);
                return Some((p1, p2, class_id));
            }
        }
        None
    }
}

impl Default for Queues {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joining_twice_is_rejected() {
        let q = Queues::new();
        q.join_non_classed(1).unwrap();
        assert!(matches!(q.join_classed(1, 5), Err(OlympiadError::AlreadyQueued)));
    }

    #[test]
    fn classed_pairs_come_from_the_lowest_class_id_with_enough_players() {
        let q = Queues::new();
        // class 20 never reaches the threshold
        q.join_classed(1, 20).unwrap();
        q.join_classed(100, 20).unwrap();
        // class 30 reaches the threshold only after class 10 does
        for id in 200..200 + CLASSED_MIN_WAITING as ObjectId {
            q.join_classed(id, 30).unwrap();
        }
        for id in 2..2 + CLASSED_MIN_WAITING as ObjectId {
            q.join_classed(id, 10).unwrap();
        }
        let (p1, p2, class_id) = q.pop_classed_pair().unwrap();
        assert_eq!(class_id, 10);
        assert_eq!((p1, p2), (2, 3));
    }

    #[test]
    fn classed_pair_does_not_form_below_the_threshold() {
        let q = Queues::new();
        for id in 1..CLASSED_MIN_WAITING as ObjectId {
            q.join_classed(id, 4).unwrap();
        }
        assert!(q.pop_classed_pair().is_none());
    }

    #[test]
    fn non_classed_pair_does_not_form_below_the_threshold() {
        let q = Queues::new();
        for id in 1..NON_CLASSED_MIN_WAITING as ObjectId {
            q.join_non_classed(id).unwrap();
        }
        assert!(q.pop_non_classed_pair().is_none());
    }

    #[test]
    fn leave_removes_from_every_queue() {
        let q = Queues::new();
        q.join_classed(9, 4).unwrap();
        q.leave(9);
        assert!(!q.is_queued(9));
        q.join_classed(9, 4).unwrap();
        assert!(q.is_queued(9));
    }
}
