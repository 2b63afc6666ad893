use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use world_types::{ObjectId, Player};

use crate::error::DuelError;
use crate::participant::Team;
use crate::restorer::ConditionRestorer;
use crate::worker::{Duel, DuelId, DuelKind};

/// Tracks which object is in which duel and mints duel ids. Does not own
/// the duel workers' lifecycles — the caller spawns `Duel::run` and calls
/// `finish` back on the manager once it completes.
pub struct DuelManager {
    next_id: AtomicU64,
    in_duel: Mutex<HashMap<ObjectId, DuelId>>,
}

impl DuelManager {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            in_duel: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_in_duel(&self, id: ObjectId) -> bool {
        self.in_duel.lock().contains_key(&id)
    }

    /// Creates a duel between the two leaders, failing if either leader is
    /// already in one (spec §4.4 guard). `CanDuel` eligibility is the
    /// caller's responsibility via `Player::can_duel`.
    pub fn create_duel(
        &self,
        kind: DuelKind,
        leader1: &Player,
        members1: Vec<ObjectId>,
        leader2: &Player,
        members2: Vec<ObjectId>,
        restorer: Arc<dyn ConditionRestorer>,
    ) -> Result<Arc<Duel>, DuelError> {
        if !leader1.can_duel() {
            return Err(DuelError::NotEligible("leader1 is below the duel HP/MP floor"));
        }
        if !leader2.can_duel() {
            return Err(DuelError::NotEligible("leader2 is below the duel HP/MP floor"));
        }

        let mut in_duel = self.in_duel.lock();
        if in_duel.contains_key(&leader1.object_id()) {
            return Err(DuelError::AlreadyInDuel(leader1.object_id()));
        }
        if in_duel.contains_key(&leader2.object_id()) {
            return Err(DuelError::AlreadyInDuel(leader2.object_id()));
        }

        let id = DuelId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let team1 = Team::party(leader1.object_id(), members1);
        let team2 = Team::party(leader2.object_id(), members2);

        for pid in team1.all_ids().chain(team2.all_ids()) {
            in_duel.insert(pid, id);
        }

        Ok(Duel::new(id, kind, team1, team2, restorer))
    }

    /// Releases every participant of a finished duel back to `NoDuel`.
    pub fn release(&self, duel: &Duel) {
        let mut in_duel = self.in_duel.lock();
        for pid in duel.team1.all_ids().chain(duel.team2.all_ids()) {
            in_duel.remove(&pid);
        }
    }
}

impl Default for DuelManager {
    fn default() -> Self {
        Self::new()
    }
}
