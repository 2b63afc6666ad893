use rand::Rng;

use crate::error::FishingError;
use crate::state::{Action, ActionRecord, EndReason, FishMode, GoodUse, TickEvent};

/// Tunables for one fishing attempt, fixed for its whole duration.
#[derive(Debug, Clone, Copy)]
pub struct FishParams {
    pub rod_damage: i32,
    pub expertise: i32,
    pub skill_power: i32,
    pub rod_level: i32,
    pub fish_shot: bool,
    pub expertise_level: i32,
    pub skill_level: i32,
    pub fish_max_hp: i32,
    pub regen_per_tick: i32,
    /// "Hard" fish are the only ones with a non-zero chance of starting (or
    /// flipping into) deceptive mode.
    pub is_hard_fish: bool,
    pub time_budget_secs: i32,
}

fn compute_damage(params: &FishParams) -> i32 {
    let base = (params.rod_damage + params.expertise + params.skill_power) as f64;
    let level_mult = params.rod_level as f64 * 0.1;
    let shot_mult = if params.fish_shot { 2.0 } else { 1.0 };
    (base * level_mult * shot_mult) as i32
}

fn compute_penalty(params: &FishParams, dmg: i32) -> i32 {
    if params.expertise_level <= params.skill_level - 2 {
        (dmg as f64 * 0.05) as i32
    } else {
        0
    }
}

fn effective(action: Action, mode: FishMode, deceptive: bool) -> bool {
    match (action, mode, deceptive) {
        (Action::Pump, FishMode::Resting, false) => true,
        (Action::Pump, FishMode::Fighting, true) => true,
        (Action::Reel, FishMode::Fighting, false) => true,
        (Action::Reel, FishMode::Resting, true) => true,
        _ => false,
    }
}

/// One fishing attempt's full mutable state (spec §4.5). Not `Sync` by
/// itself: callers serialize actions and ticks with an external lock (the
/// worker's mutex), matching the spec's "must be mutually exclusive".
pub struct FishingCombat {
    params: FishParams,
    mode: FishMode,
    deceptive_mode: bool,
    fish_cur_hp: i32,
    time_left: i32,
    stop: u8,
    last_action: Option<ActionRecord>,
    ended: bool,
}

impl FishingCombat {
    pub fn new(params: FishParams, rng: &mut impl Rng) -> Self {
        let mode = if rng.gen_bool(0.20) { FishMode::Fighting } else { FishMode::Resting };
        let deceptive_mode = params.is_hard_fish && rng.gen_bool(0.10);
        Self {
            fish_cur_hp: params.fish_max_hp,
            time_left: params.time_budget_secs,
            mode,
            deceptive_mode,
            stop: 0,
            last_action: None,
            ended: false,
            params,
        }
    }

    fn clamp_hp(&mut self) {
        let max = 2 * self.params.fish_max_hp;
        self.fish_cur_hp = self.fish_cur_hp.clamp(0, max);
    }

    pub fn fish_cur_hp(&self) -> i32 {
        self.fish_cur_hp
    }

    pub fn mode(&self) -> FishMode {
        self.mode
    }

    pub fn deceptive_mode(&self) -> bool {
        self.deceptive_mode
    }

    /// Applies one pump/reel action (spec §4.5 effectiveness rule).
    pub fn perform_action(&mut self, action: Action, rng: &mut impl Rng) -> Result<ActionRecord, FishingError> {
        if self.ended {
            return Err(FishingError::AlreadyEnded);
        }

        let dmg = compute_damage(&self.params);
        let pen = compute_penalty(&self.params, dmg);
        let resisted = rng.gen_bool(0.10);

        let (good_use, applied_damage) = if resisted {
            (GoodUse::Failed, 0)
        } else if effective(action, self.mode, self.deceptive_mode) {
            self.fish_cur_hp -= dmg;
            (GoodUse::Success, dmg)
        } else {
            self.fish_cur_hp += dmg;
            (GoodUse::Failed, dmg)
        };

        self.fish_cur_hp -= pen;
        self.clamp_hp();

        let record = ActionRecord { action, resisted, good_use, damage: applied_damage };
        self.last_action = Some(record);
        Ok(record)
    }

    /// One 1Hz tick (spec §4.5). Returns the public tick state, or the
    /// reason the minigame just ended.
    pub fn tick(&mut self, rng: &mut impl Rng) -> Result<Result<TickEvent, EndReason>, FishingError> {
        if self.ended {
            return Err(FishingError::AlreadyEnded);
        }

        self.time_left -= 1;

        if (self.mode == FishMode::Fighting) != self.deceptive_mode {
            self.fish_cur_hp += self.params.regen_per_tick;
            self.clamp_hp();
        }

        if self.stop == 0 {
            if rng.gen_bool(0.30) {
                self.mode = self.mode.flip();
            }
            if self.params.is_hard_fish && rng.gen_bool(0.10) {
                self.deceptive_mode = !self.deceptive_mode;
            }
            self.stop = 1;
        } else {
            self.stop -= 1;
        }

        let outcome = if self.fish_cur_hp >= 2 * self.params.fish_max_hp {
            Some(EndReason::Escaped)
        } else if self.fish_cur_hp <= 0 {
            Some(EndReason::Caught)
        } else if self.time_left <= 0 {
            Some(EndReason::Timeout)
        } else {
            None
        };

        if let Some(reason) = outcome {
            self.ended = true;
            return Ok(Err(reason));
        }

        let event = TickEvent {
            mode: self.mode,
            deceptive_mode: self.deceptive_mode,
            fish_cur_hp: self.fish_cur_hp,
            time_left: self.time_left,
            last_action: self.last_action.take(),
        };
        Ok(Ok(event))
    }
}
