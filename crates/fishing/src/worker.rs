use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

use crate::combat::{FishParams, FishingCombat};
use crate::error::FishingError;
use crate::state::{Action, ActionRecord, EndReason, TickEvent};

/// Drives one fishing attempt's 1Hz tick loop alongside player actions,
/// serializing both behind the same lock (spec §4.5's "must be mutually
/// exclusive").
pub struct FishingSession {
    combat: Mutex<FishingCombat>,
    rng: Mutex<StdRng>,
    cancel: CancellationToken,
    stopped: AtomicBool,
}

impl FishingSession {
    pub fn new(params: FishParams, seed: u64) -> Arc<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let combat = FishingCombat::new(params, &mut rng);
        Arc::new(Self {
            combat: Mutex::new(combat),
            rng: Mutex::new(rng),
            cancel: CancellationToken::new(),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn perform_action(&self, action: Action) -> Result<ActionRecord, FishingError> {
        let mut rng = self.rng.lock();
        self.combat.lock().perform_action(action, &mut rng)
    }

    /// Idempotent; a second call reports `AlreadyStopped` rather than
    /// closing an already-closed cancellation signal again.
    pub fn stop(&self) -> Result<(), FishingError> {
        if self.stopped.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok() {
            self.cancel.cancel();
            Ok(())
        } else {
            Err(FishingError::AlreadyStopped)
        }
    }
}

/// Runs `session`'s 1Hz tick loop until it ends naturally or `stop()` is
/// called, invoking `on_tick` with each intermediate state. Returns the end
/// reason, or `None` if stopped externally before the minigame concluded.
pub async fn run_tick_loop(session: Arc<FishingSession>, mut on_tick: impl FnMut(TickEvent)) -> Option<EndReason> {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = session.cancel.cancelled() => return None,
            _ = interval.tick() => {
                let reason = {
                    let mut rng = session.rng.lock();
                    let mut combat = session.combat.lock();
                    combat.tick(&mut rng)
                };
                match reason {
                    Ok(Ok(event)) => on_tick(event),
                    Ok(Err(reason)) => {
                        let _ = session.stop();
                        log::info!(target: "fishing", "session ended: {reason:?}");
                        return Some(reason);
                    }
                    Err(_) => return None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FishParams {
        FishParams {
            rod_damage: 50,
            expertise: 10,
            skill_power: 10,
            rod_level: 10,
            fish_shot: true,
            expertise_level: 1,
            skill_level: 1,
            fish_max_hp: 10,
            regen_per_tick: 0,
            is_hard_fish: false,
            time_budget_secs: 120,
        }
    }

    #[test]
    fn stop_is_idempotent_once() {
        let session = FishingSession::new(params(), 42);
        assert!(session.stop().is_ok());
        assert!(matches!(session.stop(), Err(FishingError::AlreadyStopped)));
    }

    #[tokio::test(start_paused = true)]
    async fn tick_loop_ends_on_quick_catch() {
        let session = FishingSession::new(params(), 7);
        let handle = tokio::spawn({
            let session = session.clone();
            async move { run_tick_loop(session, |_| {}).await }
        });
        tokio::time::advance(Duration::from_secs(60)).await;
        let reason = handle.await.unwrap();
        assert!(reason.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn external_stop_returns_none() {
        let session = FishingSession::new(params(), 99);
        let handle = tokio::spawn({
            let session = session.clone();
            async move { run_tick_loop(session, |_| {}).await }
        });
        session.stop().unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(handle.await.unwrap(), None);
    }
}
