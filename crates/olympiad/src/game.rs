use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use world_types::ObjectId;

const MAX_POINTS: i32 = 10;
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const GAME_TIME_LIMIT: Duration = Duration::from_secs(6 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GameId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    P1,
    P2,
}

impl Side {
    fn other(self) -> Side {
        match self {
            Side::P1 => Side::P2,
            Side::P2 => Side::P1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    P1Win,
    P2Win,
    Draw,
    P1Disconnected,
    P2Disconnected,
}

/// One non-classed or classed olympiad match (spec §4.7). Two participants
/// only; party olympiad games are out of scope for this core.
pub struct Game {
    pub id: GameId,
    pub p1: ObjectId,
    pub p2: ObjectId,
    pub classed: bool,
    pub stadium_slot: usize,
    started: AtomicBool,
    finished: AtomicBool,
    p1_dead: AtomicBool,
    p2_dead: AtomicBool,
    p1_disconnected: AtomicBool,
    p2_disconnected: AtomicBool,
    p1_damage: AtomicI64,
    p2_damage: AtomicI64,
    start_tick: AtomicU64,
    cancel: CancellationToken,
    result: Mutex<Option<GameResult>>,
}

impl Game {
    pub fn new(id: GameId, p1: ObjectId, p2: ObjectId, classed: bool, stadium_slot: usize) -> Arc<Self> {
        Arc::new(Self {
            id,
            p1,
            p2,
            classed,
            stadium_slot,
            started: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            p1_dead: AtomicBool::new(false),
            p2_dead: AtomicBool::new(false),
            p1_disconnected: AtomicBool::new(false),
            p2_disconnected: AtomicBool::new(false),
            p1_damage: AtomicI64::new(0),
            p2_damage: AtomicI64::new(0),
            start_tick: AtomicU64::new(0),
            cancel: CancellationToken::new(),
            result: Mutex::new(None),
        })
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn record_damage(&self, side: Side, amount: i64) {
        let counter = match side {
            Side::P1 => &self.p1_damage,
            Side::P2 => &self.p2_damage,
        };
        counter.fetch_add(amount.max(0), Ordering::AcqRel);
    }

    pub fn record_death(&self, side: Side) {
        match side {
            Side::P1 => self.p1_dead.store(true, Ordering::Release),
            Side::P2 => self.p2_dead.store(true, Ordering::Release),
        }
    }

    pub fn record_disconnect(&self, side: Side) {
        match side {
            Side::P1 => self.p1_disconnected.store(true, Ordering::Release),
            Side::P2 => self.p2_disconnected.store(true, Ordering::Release),
        }
    }

    /// Priority: disconnect, then a dead side loses, then higher damage
    /// dealt wins, else a draw. Returns `None` while the match is still
    /// undecided.
    fn compute_result(&self, elapsed: Duration) -> Option<GameResult> {
        let p1_disc = self.p1_disconnected.load(Ordering::Acquire);
        let p2_disc = self.p2_disconnected.load(Ordering::Acquire);
        if p1_disc && p2_disc {
            return Some(GameResult::Draw);
        }
        if p1_disc {
            return Some(GameResult::P1Disconnected);
        }
        if p2_disc {
            return Some(GameResult::P2Disconnected);
        }

        let p1_dead = self.p1_dead.load(Ordering::Acquire);
        let p2_dead = self.p2_dead.load(Ordering::Acquire);
        if p1_dead && p2_dead {
            return Some(self.result_by_damage());
        }
        if p1_dead {
            return Some(GameResult::P2Win);
        }
        if p2_dead {
            return Some(GameResult::P1Win);
        }

        if elapsed >= GAME_TIME_LIMIT {
            return Some(self.result_by_damage());
        }
        None
    }

    fn result_by_damage(&self) -> GameResult {
        let p1 = self.p1_damage.load(Ordering::Acquire);
        let p2 = self.p2_damage.load(Ordering::Acquire);
        match p1.cmp(&p2) {
            std::cmp::Ordering::Greater => GameResult::P1Win,
            std::cmp::Ordering::Less => GameResult::P2Win,
            std::cmp::Ordering::Equal => GameResult::Draw,
        }
    }

    fn finish(&self, result: GameResult) -> bool {
        if self
            .finished
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            *self.result.lock() = Some(result);
            self.cancel.cancel();
            true
        } else {
            false
        }
    }

    pub fn result(&self) -> Option<GameResult> {
        *self.result.lock()
    }

    /// Polls once a second until a result is reached or the match is
    /// externally cancelled (e.g. stadium shutdown), returning the final
    /// result. `now0` is the battle start instant.
    pub async fn run(self: Arc<Self>, now0: Instant) -> GameResult {
        self.started.store(true, Ordering::Release);
        self.start_tick.store(now0.elapsed().as_secs(), Ordering::Release);
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    let result = self.result().unwrap_or(GameResult::Draw);
                    return result;
                }
                _ = ticker.tick() => {
                    if let Some(result) = self.compute_result(now0.elapsed()) {
                        self.finish(result);
                        return result;
                    }
                }
            }
        }
    }
}

/// Points-delta formula (spec §4.7): the gap between opponents' current
/// points bounds how much changes hands per match, so a heavily favoured
/// noble risks little beating a weak one and gains little by doing so.
pub fn compute_points_delta(
    result: GameResult,
    p1_points: u32,
    p2_points: u32,
    classed: bool,
) -> (i32, i32) {
    let div = if classed { 3 } else { 5 };
    let diff = ((p1_points.min(p2_points) as i32) / div).clamp(1, MAX_POINTS);

    match result {
        GameResult::P1Win => (diff, -diff),
        GameResult::P2Win => (-diff, diff),
        GameResult::Draw => {
            let p1_penalty = ((p1_points as i32) / 5).clamp(1, MAX_POINTS);
            let p2_penalty = ((p2_points as i32) / 5).clamp(1, MAX_POINTS);
            (-p1_penalty, -p2_penalty)
        }
        GameResult::P1Disconnected => {
            let penalty = ((p1_points as i32) / 3).clamp(1, MAX_POINTS);
            (-penalty, diff)
        }
        GameResult::P2Disconnected => {
            let penalty = ((p2_points as i32) / 3).clamp(1, MAX_POINTS);
            (diff, -penalty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnect_outranks_a_simultaneous_death() {
        let g = Game::new(GameId(1), 10, 20, false, 0);
        g.record_death(Side::P1);
        g.record_disconnect(Side::P2);
        assert_eq!(g.compute_result(Duration::from_secs(1)), Some(GameResult::P2Disconnected));
    }

    #[test]
    fn both_dead_breaks_tie_on_damage() {
        let g = Game::new(GameId(1), 10, 20, false, 0);
        g.record_death(Side::P1);
        g.record_death(Side::P2);
        g.record_damage(Side::P1, 500);
        g.record_damage(Side::P2, 300);
        assert_eq!(g.compute_result(Duration::from_secs(1)), Some(GameResult::P1Win));
    }

    #[test]
    fn timeout_falls_back_to_damage_and_then_draw() {
        let g = Game::new(GameId(1), 10, 20, false, 0);
        assert_eq!(g.compute_result(GAME_TIME_LIMIT), Some(GameResult::Draw));
        g.record_damage(Side::P2, 1);
        assert_eq!(g.compute_result(GAME_TIME_LIMIT), Some(GameResult::P2Win));
    }

    #[test]
    fn points_delta_is_symmetric_and_bounded() {
        let (w, l) = compute_points_delta(GameResult::P1Win, 30, 30, true);
        assert_eq!((w, l), (10, -10));

        let (w, l) = compute_points_delta(GameResult::P1Win, 3, 100, true);
        assert_eq!((w, l), (1, -1));
    }

    #[test]
    fn disconnect_penalty_does_not_reduce_winner_gain() {
        let (p1, p2) = compute_points_delta(GameResult::P2Disconnected, 30, 30, false);
        assert_eq!(p1, 6, "winner still gains the full diff");
        assert_eq!(p2, -6);
    }

    #[test]
    fn draw_penalises_both_sides_independently() {
        let (p1, p2) = compute_points_delta(GameResult::Draw, 50, 10, false);
        assert_eq!(p1, -10);
        assert_eq!(p2, -2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_ends_on_cancellation_with_no_result() {
        let g = Game::new(GameId(7), 1, 2, false, 0);
        let handle = tokio::spawn(g.clone().run(Instant::now()));
        g.cancel.cancel();
        let result = handle.await.unwrap();
        assert_eq!(result, GameResult::Draw);
    }

    #[tokio::test(start_paused = true)]
    async fn run_finishes_once_a_side_dies() {
        let g = Game::new(GameId(8), 1, 2, false, 0);
        let handle = tokio::spawn(g.clone().run(Instant::now()));
        tokio::time::advance(Duration::from_millis(1100)).await;
        g.record_death(Side::P2);
        tokio::time::advance(Duration::from_secs(1)).await;
        let result = handle.await.unwrap();
        assert_eq!(result, GameResult::P1Win);
        assert!(g.is_finished());
    }
}
