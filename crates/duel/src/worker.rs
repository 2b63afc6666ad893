use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use world_types::{Location, ObjectId, SavedCondition};

use crate::participant::{ParticipantState, Team};
use crate::restorer::ConditionRestorer;

/// Squared distance beyond which a 1v1 duel is cancelled (spec §4.4).
const CANCEL_DISTANCE_SQ: i64 = 1600 * 1600;
const ONE_V_ONE_DURATION: Duration = Duration::from_secs(120);
const PARTY_DURATION: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DuelId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelKind {
    OneVsOne,
    Party,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelResult {
    Team1Surrender,
    Team2Surrender,
    Timeout,
    Team1Win,
    Team2Win,
    Cancelled,
}

/// Resolves a participant's current location, independent of however the
/// caller stores live entities (usually backed by `world_grid::Grid`).
pub trait LocationSource: Send + Sync {
    fn location_of(&self, id: ObjectId) -> Option<Location>;
}

impl LocationSource for world_grid::Grid {
    fn location_of(&self, id: ObjectId) -> Option<Location> {
        world_grid::Grid::location_of(self, id)
    }
}

/// A single running duel (spec §4.4). Constructed by `DuelManager` and
/// driven by `run`, which should be spawned onto a `tokio` task.
pub struct Duel {
    pub id: DuelId,
    pub kind: DuelKind,
    pub team1: Team,
    pub team2: Team,
    states: Mutex<HashMap<ObjectId, ParticipantState>>,
    surrender: AtomicU8,
    finished: AtomicBool,
    cancel: CancellationToken,
    saved: Mutex<HashMap<ObjectId, SavedCondition>>,
    restorer: Arc<dyn ConditionRestorer>,
}

impl Duel {
    pub fn new(id: DuelId, kind: DuelKind, team1: Team, team2: Team, restorer: Arc<dyn ConditionRestorer>) -> Arc<Self> {
        let mut states = HashMap::new();
        for pid in team1.all_ids().chain(team2.all_ids()) {
            states.insert(pid, ParticipantState::NoDuel);
        }
        Arc::new(Self {
            id,
            kind,
            team1,
            team2,
            states: Mutex::new(states),
            surrender: AtomicU8::new(0),
            finished: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            saved: Mutex::new(HashMap::new()),
            restorer,
        })
    }

    fn fight_duration(&self) -> Duration {
        match self.kind {
            DuelKind::OneVsOne => ONE_V_ONE_DURATION,
            DuelKind::Party => PARTY_DURATION,
        }
    }

    pub fn state_of(&self, id: ObjectId) -> Option<ParticipantState> {
        self.states.lock().get(&id).copied()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// First caller wins the compare-and-swap; later callers observe no
    /// change and get `false`.
    pub fn surrender(&self, team: u8) -> bool {
        debug_assert!(team == 1 || team == 2);
        self.surrender.compare_exchange(0, team, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }

    pub fn on_player_defeat(&self, id: ObjectId) {
        let mut states = self.states.lock();
        let (fallen_team, other_team) = if self.team1.contains(id) {
            (&self.team1, &self.team2)
        } else if self.team2.contains(id) {
            (&self.team2, &self.team1)
        } else {
            return;
        };
        states.insert(id, ParticipantState::Dead);
        match self.kind {
            DuelKind::OneVsOne => {
                for oid in other_team.all_ids() {
                    states.insert(oid, ParticipantState::Winner);
                }
            }
            DuelKind::Party => {
                let team_dead = fallen_team
                    .all_ids()
                    .all(|pid| matches!(states.get(&pid), Some(ParticipantState::Dead)));
                if team_dead {
                    for oid in other_team.all_ids() {
                        states.insert(oid, ParticipantState::Winner);
                    }
                }
            }
        }
    }

    /// Marks a participant `Interrupted` (disconnect, logout, teleport away
    /// mid-duel). Only checked for 1v1 duels.
    pub fn interrupt(&self, id: ObjectId) {
        self.states.lock().insert(id, ParticipantState::Interrupted);
    }

    fn check_end(&self, end_time: Instant, now: Instant, locations: &dyn LocationSource) -> Option<DuelResult> {
        match self.surrender.load(Ordering::Acquire) {
            1 => return Some(DuelResult::Team1Surrender),
            2 => return Some(DuelResult::Team2Surrender),
            _ => {}
        }
        if now >= end_time {
            return Some(DuelResult::Timeout);
        }
        {
            let states = self.states.lock();
            if states.get(&self.team1.leader) == Some(&ParticipantState::Winner) {
                return Some(DuelResult::Team1Win);
            }
            if states.get(&self.team2.leader) == Some(&ParticipantState::Winner) {
                return Some(DuelResult::Team2Win);
            }
            if self.kind == DuelKind::OneVsOne {
                if let (Some(l1), Some(l2)) =
                    (locations.location_of(self.team1.leader), locations.location_of(self.team2.leader))
                {
                    if l1.distance_sq_xy(&l2) > CANCEL_DISTANCE_SQ {
                        return Some(DuelResult::Cancelled);
                    }
                }
                if states.values().any(|s| *s == ParticipantState::Interrupted) {
                    return Some(DuelResult::Cancelled);
                }
            }
        }
        None
    }

    /// Atomic once-only finish: closes the cancellation signal. Returns
    /// `false` if the duel was already finished.
    fn finish(&self) -> bool {
        if self.finished.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
            self.cancel.cancel();
            true
        } else {
            false
        }
    }

    /// Restores every saved condition unless the duel ended abnormally
    /// (spec §4.4: distance/interrupted cancellation does not restore).
    fn restore_conditions(&self, result: DuelResult) {
        if result == DuelResult::Cancelled {
            return;
        }
        for (id, cond) in self.saved.lock().drain() {
            if let Err(err) = self.restorer.restore_condition(id, cond.hp, cond.mp, cond.cp, cond.location) {
                log::warn!(target: "duel", "failed to restore condition for {id}: {err}");
            }
        }
    }

    /// Drives the full duel lifecycle: 5-second countdown, then fighting
    /// until `check_end` returns a result. `snapshot` is called once per
    /// participant when the countdown reaches 4.
    pub async fn run(
        self: Arc<Self>,
        locations: Arc<dyn LocationSource>,
        snapshot: impl Fn(ObjectId) -> Option<SavedCondition>,
    ) -> DuelResult {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        for remaining in (0..5u8).rev() {
            interval.tick().await;
            if remaining == 4 {
                let mut saved = self.saved.lock();
                for pid in self.team1.all_ids().chain(self.team2.all_ids()) {
                    if let Some(cond) = snapshot(pid) {
                        saved.insert(pid, cond);
                    }
                }
            }
            if remaining == 0 {
                let mut states = self.states.lock();
                for pid in self.team1.all_ids().chain(self.team2.all_ids()) {
                    states.insert(pid, ParticipantState::Duelling);
                }
                log::info!(target: "duel", "duel {:?} started", self.id);
            }
        }

        let end_time = Instant::now() + self.fight_duration();
        let result = loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break DuelResult::Cancelled,
                _ = interval.tick() => {
                    if let Some(result) = self.check_end(end_time, Instant::now(), locations.as_ref()) {
                        break result;
                    }
                }
            }
        };

        self.finish();
        self.restore_conditions(result);
        log::info!(target: "duel", "duel {:?} ended: {result:?}", self.id);
        result
    }
}
